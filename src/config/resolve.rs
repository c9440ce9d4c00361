//! Environment variable substitution, API key lookup and limit defaults.

use super::types::{Config, Limits, ProviderEntry};

impl Config {
    /// Resolve `{env:VAR_NAME}` patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        if let Some(ref mut m) = self.model {
            *m = Self::resolve_str(m);
        }
        if let Some(ref mut sp) = self.system_prompt {
            *sp = Self::resolve_str(sp);
        }
        if let Some(ref mut dp) = self.default_provider {
            *dp = Self::resolve_str(dp);
        }
        Self::resolve_provider_entry(&mut self.provider.gemini);
        Self::resolve_provider_entry(&mut self.provider.anthropic);
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.openrouter);
        Self::resolve_provider_entry(&mut self.provider.ollama);
    }

    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace `{env:VAR}` with the environment variable value (empty if unset).
    ///
    /// Substituted values are not scanned again.
    fn resolve_str(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(start) = rest.find("{env:") {
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            let var_name = &rest[start + 5..start + end];
            result.push_str(&rest[..start]);
            result.push_str(&std::env::var(var_name).unwrap_or_default());
            rest = &rest[start + end + 1..];
        }
        result.push_str(rest);
        result
    }

    /// Settings for the named provider, if configured.
    pub fn provider_entry(&self, provider: &str) -> Option<&ProviderEntry> {
        match provider {
            "gemini" => self.provider.gemini.as_ref(),
            "anthropic" => self.provider.anthropic.as_ref(),
            "openai" => self.provider.openai.as_ref(),
            "openrouter" => self.provider.openrouter.as_ref(),
            "ollama" => self.provider.ollama.as_ref(),
            _ => None,
        }
    }

    /// Resolve the API key for a provider: `<PROVIDER>_API_KEY` first, then
    /// the config value. Empty strings count as missing.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        let env_key = format!("{}_API_KEY", provider.to_uppercase());
        if let Ok(val) = std::env::var(&env_key) {
            if !val.is_empty() {
                return Some(val);
            }
        }

        self.provider_entry(provider)
            .and_then(|e| e.api_key.clone())
            .filter(|k| !k.is_empty())
    }

    /// The configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// The configured model, possibly in `provider/model` form.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Limits with defaults filled in. Timeouts and the round cap are at
    /// least 1, since 0 would fail every request before it starts.
    pub fn limits(&self) -> Limits {
        let d = Limits::default();
        Limits {
            shell_timeout_secs: self
                .limits
                .shell_timeout_secs
                .unwrap_or(d.shell_timeout_secs)
                .max(1),
            max_output_bytes: self.limits.max_output_bytes.unwrap_or(d.max_output_bytes),
            read_max_bytes: self.limits.read_max_bytes.unwrap_or(d.read_max_bytes),
            model_timeout_secs: self
                .limits
                .model_timeout_secs
                .unwrap_or(d.model_timeout_secs)
                .max(1),
            max_tool_rounds: self.limits.max_tool_rounds.unwrap_or(d.max_tool_rounds).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_str_substitutes_env() {
        std::env::set_var("AIGENT_TEST_SUBST", "value");
        assert_eq!(
            Config::resolve_str("pre-{env:AIGENT_TEST_SUBST}-post"),
            "pre-value-post"
        );
        assert_eq!(Config::resolve_str("{env:AIGENT_TEST_UNSET_VAR}"), "");
        assert_eq!(Config::resolve_str("{env:broken"), "{env:broken");
    }

    #[test]
    fn test_resolve_str_does_not_expand_substituted_values() {
        std::env::set_var("AIGENT_TEST_SELF", "{env:AIGENT_TEST_SELF}");
        assert_eq!(
            Config::resolve_str("{env:AIGENT_TEST_SELF}"),
            "{env:AIGENT_TEST_SELF}"
        );
        std::env::set_var("AIGENT_TEST_PAIR", "a}b");
        assert_eq!(
            Config::resolve_str("{env:AIGENT_TEST_PAIR}-{env:AIGENT_TEST_PAIR}"),
            "a}b-a}b"
        );
    }

    #[test]
    fn test_api_key_from_config_when_env_missing() {
        let mut config = Config::default();
        config.provider.ollama = Some(ProviderEntry {
            api_key: Some("from-config".into()),
            base_url: None,
        });
        // OLLAMA_API_KEY is not a variable anyone sets.
        assert_eq!(config.resolve_api_key("ollama").as_deref(), Some("from-config"));
        config.provider.ollama = Some(ProviderEntry::default());
        assert_eq!(config.resolve_api_key("ollama"), None);
    }

    #[test]
    fn test_limits_defaults_and_overrides() {
        let mut config = Config::default();
        assert_eq!(config.limits(), Limits::default());
        config.limits.max_tool_rounds = Some(3);
        assert_eq!(config.limits().max_tool_rounds, 3);
        assert_eq!(config.limits().shell_timeout_secs, 30);
    }

    #[test]
    fn test_zero_limits_are_raised_to_one() {
        let mut config = Config::default();
        config.limits.model_timeout_secs = Some(0);
        config.limits.shell_timeout_secs = Some(0);
        config.limits.max_tool_rounds = Some(0);
        let limits = config.limits();
        assert_eq!(limits.model_timeout_secs, 1);
        assert_eq!(limits.shell_timeout_secs, 1);
        assert_eq!(limits.max_tool_rounds, 1);
    }
}
