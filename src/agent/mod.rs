//! The agent orchestrator.
//!
//! Drives one interactive session as a small state machine:
//!
//! ```text
//! AwaitingUserInput -> AwaitingModelResponse -> Dispatching -> AwaitingModelResponse ...
//!                                            \-> Rendering  -> AwaitingUserInput
//! ```
//!
//! `SessionEnded` is terminal. Tool calls are executed in the order the model
//! returned them, each behind the approval gate, and their outcomes are fed
//! back automatically until the model answers with plain text.

use anyhow::Result;
use colored::Colorize;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::approval::{Approval, ApprovalGate};
use crate::console::Console;
use crate::constants::{DENIAL_MESSAGE, EXIT_COMMAND};
use crate::format;
use crate::model::{ModelClient, ModelError, ModelResponse, Usage};
use crate::tokens::{self, ContextStatus};
use crate::tools::{executor, ToolDefinition, ToolError, ToolRegistry};
use crate::transcript::{ToolInvocationRequest, ToolOutcome, Transcript, Turn};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingUserInput,
    AwaitingModelResponse,
    Dispatching,
    Rendering,
    SessionEnded,
}

/// Knobs for one session.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Sent as the preamble of every request.
    pub system_prompt: Option<String>,
    /// Model id, used for context window lookups.
    pub model_name: String,
    /// Automatic tool rounds allowed per user input.
    pub max_tool_rounds: usize,
    pub model_timeout: Duration,
}

pub struct Agent<M> {
    model: M,
    tools: ToolRegistry,
    manifest: Vec<ToolDefinition>,
    gate: ApprovalGate,
    config: AgentConfig,
    transcript: Transcript,
    /// Content waiting to be sent as the next user turn.
    pending: VecDeque<String>,
    state: SessionState,
    /// Reply being dispatched or rendered.
    response: Option<ModelResponse>,
    tool_rounds: usize,
    /// Set when the tool round cap is hit: the next input comes from the user
    /// even if follow-ups are queued.
    yield_to_user: bool,
}

impl<M: ModelClient> Agent<M> {
    pub fn new(model: M, tools: ToolRegistry, gate: ApprovalGate, config: AgentConfig) -> Self {
        let manifest = tools.manifest();
        Self {
            model,
            tools,
            manifest,
            gate,
            config,
            transcript: Transcript::new(),
            pending: VecDeque::new(),
            state: SessionState::AwaitingUserInput,
            response: None,
            tool_rounds: 0,
            yield_to_user: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run until the user types `exit` or input ends.
    ///
    /// Model failures are reported and the session continues. Only console
    /// I/O failures and broken transcript invariants end it with an error.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<()> {
        info!(tools = self.manifest.len(), "session started");
        while self.state != SessionState::SessionEnded {
            debug!(state = ?self.state, "step");
            self.state = match self.state {
                SessionState::AwaitingUserInput => self.next_input(console)?,
                SessionState::AwaitingModelResponse => self.request(console).await?,
                SessionState::Dispatching => self.dispatch(console).await?,
                SessionState::Rendering => self.render(console),
                SessionState::SessionEnded => SessionState::SessionEnded,
            };
        }
        info!(turns = self.transcript.len(), "session ended");
        Ok(())
    }

    /// Take the next queued content, reading a line from the user when the
    /// queue is empty.
    fn next_input(&mut self, console: &mut dyn Console) -> Result<SessionState> {
        if self.pending.is_empty() || self.yield_to_user {
            let Some(line) = console.read_line(">")? else {
                return Ok(SessionState::SessionEnded);
            };
            let line = line.trim();
            if line == EXIT_COMMAND {
                return Ok(SessionState::SessionEnded);
            }
            if line.is_empty() {
                return Ok(SessionState::AwaitingUserInput);
            }
            self.pending.push_back(line.to_string());
            self.tool_rounds = 0;
            self.yield_to_user = false;
        }

        match self.pending.pop_front() {
            Some(text) => {
                self.transcript.append(Turn::user(text))?;
                Ok(SessionState::AwaitingModelResponse)
            }
            None => Ok(SessionState::AwaitingUserInput),
        }
    }

    /// One model round trip with the full transcript.
    async fn request(&mut self, console: &mut dyn Console) -> Result<SessionState> {
        let timeout = self.config.model_timeout;
        let reply = tokio::time::timeout(
            timeout,
            self.model.generate(
                self.config.system_prompt.as_deref(),
                self.transcript.snapshot(),
                &self.manifest,
            ),
        )
        .await
        .unwrap_or(Err(ModelError::Timeout(timeout.as_secs())));

        let response = match reply {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "model request failed");
                console.print_error(&e.to_string());
                return Ok(SessionState::AwaitingUserInput);
            }
        };

        debug!(
            calls = response.calls.len(),
            has_text = response.text.is_some(),
            "model replied"
        );
        self.transcript.append(response.to_turn())?;

        let next = if response.has_calls() {
            SessionState::Dispatching
        } else {
            SessionState::Rendering
        };
        self.response = Some(response);
        Ok(next)
    }

    /// Run every requested call in order and record its outcome.
    async fn dispatch(&mut self, console: &mut dyn Console) -> Result<SessionState> {
        let Some(response) = self.response.take() else {
            return Ok(SessionState::AwaitingUserInput);
        };
        if let Some(ref text) = response.text {
            console.print(&format::render_markdown_lite(text));
        }

        let mut denials: Vec<String> = Vec::new();
        for call in &response.calls {
            let outcome = self.run_call(console, call).await?;
            console.print(&format::tool_outcome(&call.tool_name, &outcome));
            if let ToolOutcome::Denied { ref clarification } = outcome {
                denials.push(denial_text(clarification.as_deref()));
            }
            self.transcript.append(Turn::ToolOutcome {
                call_id: call.call_id.clone(),
                tool_name: call.tool_name.clone(),
                outcome,
            })?;
        }
        if !denials.is_empty() {
            self.pending.push_back(denials.join("\n"));
        }

        self.tool_rounds += 1;
        if self.tool_rounds >= self.config.max_tool_rounds {
            warn!(rounds = self.tool_rounds, "tool round limit reached");
            console.print(
                &format!(
                    "Stopped after {} tool rounds. Type a message to continue.",
                    self.tool_rounds
                )
                .yellow()
                .to_string(),
            );
            self.yield_to_user = true;
            return Ok(SessionState::AwaitingUserInput);
        }

        if self.pending.is_empty() {
            Ok(SessionState::AwaitingModelResponse)
        } else {
            Ok(SessionState::AwaitingUserInput)
        }
    }

    async fn run_call(
        &mut self,
        console: &mut dyn Console,
        call: &ToolInvocationRequest,
    ) -> Result<ToolOutcome> {
        let Some(tool) = self.tools.lookup(&call.tool_name) else {
            warn!(tool = %call.tool_name, "model requested an unknown tool");
            return Ok(ToolOutcome::failure(
                ToolError::UnknownTool(call.tool_name.clone()).to_string(),
            ));
        };

        let prompt = match tool.prompt(&call.arguments) {
            Ok(prompt) => prompt,
            Err(e) => return Ok(ToolOutcome::failure(e.to_string())),
        };

        match self
            .gate
            .decide(console, tool.as_ref(), &call.arguments, &prompt)?
        {
            Approval::Approved => {
                console.print(&format::tool_start(&prompt));
                Ok(executor::execute(tool.as_ref(), &call.arguments).await)
            }
            Approval::Denied { clarification } => {
                info!(tool = %call.tool_name, "call denied");
                Ok(ToolOutcome::Denied { clarification })
            }
        }
    }

    /// Print the model's answer, its usage and any context warning.
    fn render(&mut self, console: &mut dyn Console) -> SessionState {
        if let Some(response) = self.response.take() {
            if let Some(ref text) = response.text {
                console.print(&format::render_markdown_lite(text));
            }
            if let Some(usage) = response.usage {
                console.print(&usage_line(&usage).dimmed().to_string());
            }
        }
        self.warn_context(console);
        SessionState::AwaitingUserInput
    }

    fn warn_context(&self, console: &mut dyn Console) {
        let used = match tokens::count_transcript_tokens(
            self.config.system_prompt.as_deref(),
            self.transcript.snapshot(),
            &self.config.model_name,
        ) {
            Ok(used) => used,
            Err(e) => {
                debug!(error = %e, "token count unavailable");
                return;
            }
        };
        let limit = crate::models::context_window(&self.config.model_name);
        match tokens::check_context_usage(used, limit) {
            ContextStatus::Ok { .. } => {}
            ContextStatus::Warning {
                used,
                limit,
                percent,
            } => console.print(
                &format!(
                    "Context: {} ({}%), the conversation is getting long",
                    tokens::format_token_usage(used, limit),
                    percent
                )
                .yellow()
                .to_string(),
            ),
            ContextStatus::Critical {
                used,
                limit,
                percent,
            } => console.print(
                &format!(
                    "Context: {} ({}%), start a new session soon",
                    tokens::format_token_usage(used, limit),
                    percent
                )
                .red()
                .to_string(),
            ),
        }
    }
}

/// The synthetic follow-up sent after a denied call.
pub fn denial_text(clarification: Option<&str>) -> String {
    match clarification.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("{DENIAL_MESSAGE} {c}"),
        None => DENIAL_MESSAGE.to_string(),
    }
}

fn usage_line(usage: &Usage) -> String {
    format!(
        "Tokens: {} total ({} prompt, {} completion)",
        tokens::format_number(usage.total as usize),
        tokens::format_number(usage.prompt as usize),
        tokens::format_number(usage.completion as usize)
    )
}
