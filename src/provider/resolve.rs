//! Resolves which provider and model to use from CLI flags, config and
//! defaults. Supports `provider/model` shorthand.

use anyhow::Result;

use super::kind::ProviderKind;
use crate::config::Config;
use crate::constants::DEFAULT_PROVIDER;

/// Resolved provider + model pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Resolve which provider and model to use.
/// Priority: CLI flags > config > defaults.
///
/// Accepts these formats:
///   --model anthropic/claude-sonnet-4-6  (shorthand, only when --provider is omitted)
///   --provider openrouter --model "org/model-name"  (slash kept in the model name)
///   --provider gemini  (uses the provider's default model)
///   (nothing)  (uses config, then the built-in default)
pub fn resolve_model(
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    config: &Config,
) -> Result<ModelSelection> {
    if cli_provider.is_none() {
        if let Some(selection) = cli_model.map(parse_shorthand).transpose()?.flatten() {
            return Ok(selection);
        }
    }

    let provider_str = cli_provider
        .or(config.provider_name())
        .unwrap_or(DEFAULT_PROVIDER);
    let provider = ProviderKind::parse(provider_str)?;

    // A config model only applies when the CLI did not pick a provider of its own.
    let config_model = if cli_provider.is_none() {
        config.model_name()
    } else {
        None
    };

    if cli_model.is_none() {
        if let Some(selection) = config_model.map(parse_shorthand).transpose()?.flatten() {
            return Ok(selection);
        }
    }

    let model = cli_model
        .or(config_model)
        .map(String::from)
        .unwrap_or_else(|| provider.default_model().to_string());

    Ok(ModelSelection { provider, model })
}

/// `provider/model` when the prefix names a known provider, otherwise `None`.
fn parse_shorthand(model: &str) -> Result<Option<ModelSelection>> {
    let Some((prov, name)) = model.split_once('/') else {
        return Ok(None);
    };
    match ProviderKind::parse(prov) {
        Ok(provider) => Ok(Some(ModelSelection {
            provider,
            model: name.to_string(),
        })),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_defaults_to_gemini() {
        let sel = resolve_model(None, None, &config()).unwrap();
        assert_eq!(sel.provider, ProviderKind::Gemini);
        assert_eq!(sel.model, crate::constants::DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_shorthand() {
        let sel = resolve_model(None, Some("anthropic/claude-haiku-4-5"), &config()).unwrap();
        assert_eq!(sel.provider, ProviderKind::Anthropic);
        assert_eq!(sel.model, "claude-haiku-4-5");
    }

    #[test]
    fn test_explicit_provider_keeps_slash() {
        let sel = resolve_model(Some("openrouter"), Some("org/model"), &config()).unwrap();
        assert_eq!(sel.provider, ProviderKind::OpenRouter);
        assert_eq!(sel.model, "org/model");
    }

    #[test]
    fn test_provider_flag_uses_its_default_model() {
        let mut cfg = config();
        cfg.model = Some("gemini-2.5-pro".into());
        let sel = resolve_model(Some("ollama"), None, &cfg).unwrap();
        assert_eq!(sel.model, crate::constants::OLLAMA_DEFAULT_MODEL);
    }

    #[test]
    fn test_config_model_and_provider() {
        let mut cfg = config();
        cfg.default_provider = Some("anthropic".into());
        cfg.model = Some("claude-opus-4-6".into());
        let sel = resolve_model(None, None, &cfg).unwrap();
        assert_eq!(sel.provider, ProviderKind::Anthropic);
        assert_eq!(sel.model, "claude-opus-4-6");
    }

    #[test]
    fn test_unknown_provider_errors() {
        assert!(resolve_model(Some("bard"), None, &config()).is_err());
    }
}
