//! The seam between the orchestrator and a language model.

use async_trait::async_trait;
use thiserror::Error;

use crate::tools::ToolDefinition;
use crate::transcript::{ToolInvocationRequest, Turn};

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub total: u64,
    pub prompt: u64,
    pub completion: u64,
}

/// One model reply: plain text, tool calls, or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub calls: Vec<ToolInvocationRequest>,
    pub usage: Option<Usage>,
}

impl ModelResponse {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn has_calls(&self) -> bool {
        !self.calls.is_empty()
    }

    /// The transcript turn recording this reply verbatim.
    pub fn to_turn(&self) -> Turn {
        if self.has_calls() {
            Turn::ModelToolCall {
                text: self.text.clone(),
                calls: self.calls.clone(),
            }
        } else {
            Turn::model(self.text.clone().unwrap_or_default())
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("model did not answer within {0}s")]
    Timeout(u64),
    #[error("model returned an empty response")]
    Empty,
}

/// Anything that can turn a transcript into the next model reply.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the whole transcript and the tool manifest, wait for one reply.
    async fn generate(
        &self,
        preamble: Option<&str>,
        transcript: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ModelError>;
}
