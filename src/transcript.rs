//! Conversation state for an agent session.
//!
//! A [`Transcript`] is the ordered, append-only list of [`Turn`]s replayed to
//! the model on every request. Turns are never removed or reordered, and a
//! tool call must be answered by its [`ToolOutcome`] before anything else is
//! appended.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// The provider's id for the call, kept verbatim for replay. It need not
    /// be unique: Gemini reuses the function name. Outcomes are paired by
    /// position, not by this id.
    pub call_id: String,
    /// Secondary correlation id some APIs (OpenAI Responses) require on replay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_call_id: Option<String>,
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// Arguments exactly as produced by the model.
    pub arguments: Value,
}

impl ToolInvocationRequest {
    pub fn new(call_id: impl Into<String>, tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            call_id: call_id.into(),
            provider_call_id: None,
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Result of one tool invocation, as recorded in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { output: Value },
    Failure { error: String },
    Denied { clarification: Option<String> },
}

impl ToolOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            error: error.into(),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    /// JSON text fed back to the model as the tool result.
    pub fn to_model_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"status\":\"failure\",\"error\":\"{e}\"}}"))
    }
}

/// One entry of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Text typed by the user, or a synthetic follow-up such as a denial.
    UserText { text: String },
    /// A plain text answer from the model.
    ModelText { text: String },
    /// A model message that requested tools, kept raw so it replays verbatim.
    ModelToolCall {
        text: Option<String>,
        calls: Vec<ToolInvocationRequest>,
    },
    /// The outcome of one requested call.
    ToolOutcome {
        call_id: String,
        tool_name: String,
        outcome: ToolOutcome,
    },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::UserText { text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Turn::ModelText { text: text.into() }
    }

    /// Plain text carried by the turn, used for token counting and history display.
    pub fn text(&self) -> String {
        match self {
            Turn::UserText { text } | Turn::ModelText { text } => text.clone(),
            Turn::ModelToolCall { text, calls } => {
                let mut out = text.clone().unwrap_or_default();
                for call in calls {
                    out.push('\n');
                    out.push_str(&format!("{}({})", call.tool_name, call.arguments));
                }
                out
            }
            Turn::ToolOutcome { outcome, .. } => outcome.to_model_text(),
        }
    }
}

/// Violations of the transcript's ordering rules.
#[derive(Debug, Error, PartialEq)]
pub enum TranscriptError {
    #[error("tool call {0} has no outcome yet")]
    UnansweredToolCall(String),
    #[error("outcome for {0} does not answer the next pending tool call")]
    UnexpectedOutcome(String),
}

/// Ordered, append-only conversation history.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, enforcing that every tool call is answered in order
    /// before any other turn follows it.
    pub fn append(&mut self, turn: Turn) -> Result<(), TranscriptError> {
        let pending = self.unanswered_calls();
        match &turn {
            Turn::ToolOutcome { call_id, .. } => {
                if pending.first() != Some(call_id) {
                    return Err(TranscriptError::UnexpectedOutcome(call_id.clone()));
                }
            }
            _ => {
                if let Some(call_id) = pending.first() {
                    return Err(TranscriptError::UnansweredToolCall(call_id.clone()));
                }
            }
        }
        tracing::trace!(turns = self.turns.len() + 1, "transcript append");
        self.turns.push(turn);
        Ok(())
    }

    /// The full history, in order.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Call ids of the most recent tool-call turn that have no outcome yet.
    pub fn unanswered_calls(&self) -> Vec<String> {
        let Some(pos) = self
            .turns
            .iter()
            .rposition(|t| matches!(t, Turn::ModelToolCall { .. }))
        else {
            return Vec::new();
        };
        let Turn::ModelToolCall { calls, .. } = &self.turns[pos] else {
            return Vec::new();
        };
        let answered = self.turns.len() - pos - 1;
        calls
            .iter()
            .skip(answered)
            .map(|c| c.call_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolInvocationRequest {
        ToolInvocationRequest::new(id, "shell_command", json!({"command": "ls"}))
    }

    fn outcome(id: &str) -> Turn {
        Turn::ToolOutcome {
            call_id: id.into(),
            tool_name: "shell_command".into(),
            outcome: ToolOutcome::Success { output: json!({}) },
        }
    }

    #[test]
    fn test_append_only_snapshot() {
        let mut t = Transcript::new();
        let turns = vec![Turn::user("hi"), Turn::model("hello"), Turn::user("again")];
        let mut previous: Vec<Turn> = Vec::new();
        for turn in turns {
            t.append(turn).unwrap();
            let snap = t.snapshot();
            assert_eq!(snap.len(), previous.len() + 1);
            assert_eq!(&snap[..previous.len()], previous.as_slice());
            previous = snap.to_vec();
        }
    }

    #[test]
    fn test_user_turn_rejected_while_call_pending() {
        let mut t = Transcript::new();
        t.append(Turn::user("list files")).unwrap();
        t.append(Turn::ModelToolCall {
            text: None,
            calls: vec![call("c1")],
        })
        .unwrap();
        assert_eq!(
            t.append(Turn::user("hello?")),
            Err(TranscriptError::UnansweredToolCall("c1".into()))
        );
        t.append(outcome("c1")).unwrap();
        t.append(Turn::user("thanks")).unwrap();
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn test_outcomes_must_follow_call_order() {
        let mut t = Transcript::new();
        t.append(Turn::ModelToolCall {
            text: Some("two things".into()),
            calls: vec![call("a"), call("b")],
        })
        .unwrap();
        assert_eq!(
            t.append(outcome("b")),
            Err(TranscriptError::UnexpectedOutcome("b".into()))
        );
        t.append(outcome("a")).unwrap();
        assert_eq!(t.unanswered_calls(), vec!["b".to_string()]);
        t.append(outcome("b")).unwrap();
        assert!(t.unanswered_calls().is_empty());
    }

    #[test]
    fn test_repeated_provider_ids_pair_by_position() {
        let mut t = Transcript::new();
        t.append(Turn::ModelToolCall {
            text: None,
            calls: vec![call("read_file"), call("read_file")],
        })
        .unwrap();
        t.append(outcome("read_file")).unwrap();
        assert_eq!(t.unanswered_calls(), vec!["read_file".to_string()]);
        t.append(outcome("read_file")).unwrap();
        assert!(t.unanswered_calls().is_empty());
        t.append(Turn::user("next")).unwrap();
    }

    #[test]
    fn test_outcome_without_call_rejected() {
        let mut t = Transcript::new();
        assert!(t.append(outcome("x")).is_err());
        assert!(t.is_empty());
    }

    #[test]
    fn test_outcome_model_text_is_tagged_json() {
        let text = ToolOutcome::failure("boom").to_model_text();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"status": "failure", "error": "boom"}));
    }
}
