//! Provider kind enumeration and default model mapping.

use anyhow::{anyhow, Result};

use crate::constants::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL, DEFAULT_OPENROUTER_MODEL,
    OLLAMA_DEFAULT_MODEL,
};

/// Identifies which LLM provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Gemini.
    Gemini,
    /// Anthropic (Claude models).
    Anthropic,
    /// OpenAI (GPT models).
    OpenAI,
    /// OpenRouter (multi-provider gateway).
    OpenRouter,
    /// Ollama (local models via OpenAI-compatible API).
    Ollama,
}

impl ProviderKind {
    /// Parses a provider name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!(
                "Unknown provider: {other}. Supported: gemini, anthropic, openai, openrouter, ollama"
            )),
        }
    }

    /// Lowercase name used in config tables and `<NAME>_API_KEY`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Self::OpenAI => DEFAULT_OPENAI_MODEL,
            Self::OpenRouter => DEFAULT_OPENROUTER_MODEL,
            Self::Ollama => OLLAMA_DEFAULT_MODEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ProviderKind::parse("Gemini").unwrap(), ProviderKind::Gemini);
        assert_eq!(ProviderKind::parse("OLLAMA").unwrap(), ProviderKind::Ollama);
        assert!(ProviderKind::parse("bard").is_err());
    }

    #[test]
    fn test_name_round_trips() {
        for kind in [
            ProviderKind::Gemini,
            ProviderKind::Anthropic,
            ProviderKind::OpenAI,
            ProviderKind::OpenRouter,
            ProviderKind::Ollama,
        ] {
            assert_eq!(ProviderKind::parse(kind.name()).unwrap(), kind);
        }
    }
}
