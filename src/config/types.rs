//! Struct definitions and serde defaults for aigent configuration.

use crate::approval::PermissionConfig;
use crate::constants::{
    MAX_TOOL_ROUNDS_DEFAULT, MODEL_TIMEOUT_SECS_DEFAULT, READ_FILE_MAX_SIZE_DEFAULT,
    SHELL_MAX_OUTPUT_DEFAULT, SHELL_TIMEOUT_SECS_DEFAULT,
};
use serde::{Deserialize, Serialize};

/// Root configuration for aigent, deserialized from `config.toml`.
///
/// Every field is optional so aigent runs with sensible defaults when no
/// config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model identifier, optionally as `provider/model`.
    #[serde(default)]
    pub model: Option<String>,
    /// Default provider name (e.g., "gemini", "anthropic").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// System prompt sent as the preamble of every request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,
    /// Names of the tools offered to the model. `None` enables all built-ins.
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    /// Which tools run without confirmation.
    #[serde(default)]
    pub permissions: PermissionConfig,
    /// Timeouts and size caps.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Returns the default system prompt for new conversations.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization
/// so configs without an explicit `system_prompt` still get one.
pub(super) fn default_system_prompt() -> Option<String> {
    Some(crate::constants::DEFAULT_SYSTEM_PROMPT.to_string())
}

/// Provider-specific configuration map.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub gemini: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub openai: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key for authentication. The `<PROVIDER>_API_KEY` variable wins.
    pub api_key: Option<String>,
    /// Custom base URL (proxies, self-hosted instances).
    pub base_url: Option<String>,
}

/// Optional overrides for the loop's timeouts and size caps.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LimitsConfig {
    pub shell_timeout_secs: Option<u64>,
    pub max_output_bytes: Option<usize>,
    pub read_max_bytes: Option<u64>,
    pub model_timeout_secs: Option<u64>,
    pub max_tool_rounds: Option<usize>,
}

/// Limits with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    pub shell_timeout_secs: u64,
    pub max_output_bytes: usize,
    pub read_max_bytes: u64,
    pub model_timeout_secs: u64,
    pub max_tool_rounds: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            shell_timeout_secs: SHELL_TIMEOUT_SECS_DEFAULT,
            max_output_bytes: SHELL_MAX_OUTPUT_DEFAULT,
            read_max_bytes: READ_FILE_MAX_SIZE_DEFAULT,
            model_timeout_secs: MODEL_TIMEOUT_SECS_DEFAULT,
            max_tool_rounds: MAX_TOOL_ROUNDS_DEFAULT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            default_provider: None,
            provider: ProviderConfig::default(),
            system_prompt: default_system_prompt(),
            tools: None,
            permissions: PermissionConfig::with_defaults(),
            limits: LimitsConfig::default(),
        }
    }
}
