//! rig-core backed [`ModelClient`].
//!
//! [`Provider`] wraps one rig-core provider client behind enum dispatch and
//! sends the whole transcript as a single non-streaming completion request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::providers::{anthropic, gemini, openai, openrouter};
use tracing::debug;

use super::convert::{split_choice, tools_to_rig, transcript_to_rig};
use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::config::Config;
use crate::constants::{MAX_TOKENS, OLLAMA_DEFAULT_BASE_URL};
use crate::model::{ModelClient, ModelError, ModelResponse, Usage};
use crate::tools::ToolDefinition;
use crate::transcript::Turn;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Gemini(gemini::Client),
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to handle completion requests.
pub struct Provider {
    client: ClientKind,
    model: String,
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Gemini($client) => $body,
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

impl Provider {
    /// Creates a new [`Provider`] from the loaded config and model selection.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(config: &Config, selection: &ModelSelection) -> Result<Self> {
        let model = selection.model.clone();
        let client = match selection.provider {
            ProviderKind::Gemini => ClientKind::Gemini(
                gemini::Client::new(&api_key(config, ProviderKind::Gemini)?)
                    .context("Failed to create Gemini client")?,
            ),
            ProviderKind::Anthropic => ClientKind::Anthropic(
                anthropic::Client::new(&api_key(config, ProviderKind::Anthropic)?)
                    .context("Failed to create Anthropic client")?,
            ),
            ProviderKind::OpenAI => ClientKind::OpenAI(
                openai::Client::new(&api_key(config, ProviderKind::OpenAI)?)
                    .context("Failed to create OpenAI client")?,
            ),
            ProviderKind::OpenRouter => ClientKind::OpenRouter(
                openrouter::Client::new(&api_key(config, ProviderKind::OpenRouter)?)
                    .context("Failed to create OpenRouter client")?,
            ),
            ProviderKind::Ollama => {
                let base_url = config
                    .provider_entry("ollama")
                    .and_then(|o| o.base_url.as_deref())
                    .unwrap_or(OLLAMA_DEFAULT_BASE_URL);
                let client = openai::Client::builder()
                    .api_key("ollama")
                    .base_url(format!("{}/v1", base_url))
                    .build()
                    .context("Failed to create Ollama client")?;
                ClientKind::Ollama(client)
            }
        };
        Ok(Self { client, model })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Key for a hosted provider. A missing key is fatal at startup.
fn api_key(config: &Config, kind: ProviderKind) -> Result<String> {
    let name = kind.name();
    config.resolve_api_key(name).with_context(|| {
        format!(
            "No API key found for {name}. Set {}_API_KEY or configure it in config.toml",
            name.to_uppercase()
        )
    })
}

#[async_trait]
impl ModelClient for Provider {
    async fn generate(
        &self,
        preamble: Option<&str>,
        transcript: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ModelError> {
        let mut history = transcript_to_rig(transcript);
        let prompt = history
            .pop()
            .ok_or_else(|| ModelError::Request("nothing to send".into()))?;
        let rig_tools = tools_to_rig(tools);

        debug!(
            model = %self.model,
            messages = history.len() + 1,
            tools = rig_tools.len(),
            "sending completion request"
        );

        let response = dispatch!(self, |client| {
            let mut request = client
                .completion_model(self.model.as_str())
                .completion_request(prompt)
                .messages(history)
                .tools(rig_tools)
                .max_tokens(MAX_TOKENS);
            if let Some(preamble) = preamble {
                request = request.preamble(preamble.to_string());
            }
            let response = request
                .send()
                .await
                .map_err(|e| ModelError::Request(e.to_string()))?;
            (response.choice, response.usage)
        });

        let (choice, usage) = response;
        let (text, calls) = split_choice(choice);
        if text.is_none() && calls.is_empty() {
            return Err(ModelError::Empty);
        }

        Ok(ModelResponse {
            text,
            calls,
            usage: Some(Usage {
                total: usage.total_tokens,
                prompt: usage.input_tokens,
                completion: usage.output_tokens,
            }),
        })
    }
}
