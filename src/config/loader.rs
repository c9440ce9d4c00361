//! File loading and merging for aigent configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{default_system_prompt, Config, LimitsConfig, ProviderConfig, ProviderEntry};
use crate::approval::PermissionConfig;

/// Written to `config.toml` the first time aigent runs.
const DEFAULT_CONFIG_TOML: &str = r#"default_provider = "gemini"

# Tools offered to the model. Remove one to disable it.
tools = ["shell_command", "read_file", "write_file"]

[provider.gemini]
api_key = "{env:GEMINI_API_KEY}"

[provider.anthropic]
api_key = "{env:ANTHROPIC_API_KEY}"

[provider.openai]
api_key = "{env:OPENAI_API_KEY}"

[provider.openrouter]
api_key = "{env:OPENROUTER_API_KEY}"

[provider.ollama]
base_url = "http://localhost:11434"

# allow = run without asking, ask = confirm each call, deny = always refuse
[permissions.tools]
read_file = "allow"
shell_command = "ask"
write_file = "ask"

# Shell commands matching these patterns skip the prompt ("git *" matches "git status").
[permissions.shell_commands]

[limits]
shell_timeout_secs = 30
model_timeout_secs = 120
max_tool_rounds = 25
"#;

impl Config {
    /// Loads the global config from `~/.config/aigent/config.toml`.
    ///
    /// If no config file exists, creates one with defaults (including
    /// `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "created default config");
            return Self::parse(DEFAULT_CONFIG_TOML, &path);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::parse(&contents, &path)
    }

    /// Parse a global config. Tools missing from `[permissions]` keep their
    /// built-in defaults, so `read_file` stays allowed unless configured.
    pub(super) fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let mut config = Self::parse_raw(contents, origin)?;
        let configured = std::mem::take(&mut config.permissions);
        config.permissions = merge_permissions(PermissionConfig::with_defaults(), configured);
        Ok(config)
    }

    /// Parse a file as written. Project files use this so an absent
    /// `[permissions]` section leaves the global table alone.
    pub(super) fn parse_raw(contents: &str, origin: &Path) -> Result<Self> {
        toml::from_str(contents).with_context(|| format!("Failed to parse config at {:?}", origin))
    }

    /// Look for `aigent.toml` in `start`, then walk up to the git root.
    pub(super) fn load_project(start: &Path) -> Result<Option<Config>> {
        let mut dir = start.to_path_buf();
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                let contents = fs::read_to_string(&candidate)
                    .with_context(|| format!("Failed to read config from {:?}", candidate))?;
                tracing::debug!(path = %candidate.display(), "loaded project config");
                return Self::parse_raw(&contents, &candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config. Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: project.model.or(global.model),
            default_provider: project.default_provider.or(global.default_provider),
            provider: ProviderConfig {
                gemini: merge_entry(global.provider.gemini, project.provider.gemini),
                anthropic: merge_entry(global.provider.anthropic, project.provider.anthropic),
                openai: merge_entry(global.provider.openai, project.provider.openai),
                openrouter: merge_entry(global.provider.openrouter, project.provider.openrouter),
                ollama: merge_entry(global.provider.ollama, project.provider.ollama),
            },
            // serde fills the default prompt in, so only a changed one overrides
            system_prompt: if project.system_prompt != default_system_prompt() {
                project.system_prompt
            } else {
                global.system_prompt
            },
            tools: project.tools.or(global.tools),
            permissions: merge_permissions(global.permissions, project.permissions),
            limits: LimitsConfig {
                shell_timeout_secs: project
                    .limits
                    .shell_timeout_secs
                    .or(global.limits.shell_timeout_secs),
                max_output_bytes: project
                    .limits
                    .max_output_bytes
                    .or(global.limits.max_output_bytes),
                read_max_bytes: project.limits.read_max_bytes.or(global.limits.read_max_bytes),
                model_timeout_secs: project
                    .limits
                    .model_timeout_secs
                    .or(global.limits.model_timeout_secs),
                max_tool_rounds: project.limits.max_tool_rounds.or(global.limits.max_tool_rounds),
            },
        }
    }
}

fn merge_entry(global: Option<ProviderEntry>, project: Option<ProviderEntry>) -> Option<ProviderEntry> {
    match (global, project) {
        (Some(g), Some(p)) => Some(ProviderEntry {
            api_key: p.api_key.or(g.api_key),
            base_url: p.base_url.or(g.base_url),
        }),
        (g, p) => p.or(g),
    }
}

fn merge_permissions(mut global: PermissionConfig, project: PermissionConfig) -> PermissionConfig {
    global.tools.extend(project.tools);
    global.shell_commands.extend(project.shell_commands);
    global
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::Permission;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG_TOML, Path::new("default")).unwrap();
        assert_eq!(config.default_provider.as_deref(), Some("gemini"));
        assert_eq!(config.tools.as_ref().map(|t| t.len()), Some(3));
        assert_eq!(
            config.permissions.tools.get("read_file"),
            Some(&Permission::Allow)
        );
        assert!(config.system_prompt.is_some());
        assert_eq!(config.limits.max_tool_rounds, Some(25));
    }

    #[test]
    fn test_merge_project_wins() {
        let global = Config::parse(DEFAULT_CONFIG_TOML, Path::new("global")).unwrap();
        let project = Config::parse_raw(
            r#"
model = "anthropic/claude-sonnet-4-6"
tools = ["read_file"]

[provider.ollama]
api_key = "local"

[permissions.tools]
write_file = "allow"

[limits]
shell_timeout_secs = 5
"#,
            Path::new("project"),
        )
        .unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.model.as_deref(), Some("anthropic/claude-sonnet-4-6"));
        assert_eq!(merged.tools, Some(vec!["read_file".to_string()]));
        assert_eq!(merged.limits.shell_timeout_secs, Some(5));
        assert_eq!(merged.limits.model_timeout_secs, Some(120));
        assert_eq!(
            merged.permissions.tools.get("write_file"),
            Some(&Permission::Allow)
        );
        assert_eq!(
            merged.permissions.tools.get("shell_command"),
            Some(&Permission::Ask)
        );
        let ollama = merged.provider.ollama.unwrap();
        assert_eq!(ollama.api_key.as_deref(), Some("local"));
        assert_eq!(ollama.base_url.as_deref(), Some("http://localhost:11434"));
    }

    #[test]
    fn test_config_without_permissions_keeps_read_file_allowed() {
        let config = Config::parse("default_provider = \"gemini\"\n", Path::new("global")).unwrap();
        let gate = crate::approval::ApprovalGate::new(config.permissions);
        assert_eq!(
            gate.check("read_file", &serde_json::json!({"path": "a"})),
            Permission::Allow
        );
        assert_eq!(
            gate.check("write_file", &serde_json::json!({"path": "a"})),
            Permission::Ask
        );
    }

    #[test]
    fn test_partial_permissions_overlay_defaults() {
        let config = Config::parse(
            "[permissions.tools]\nshell_command = \"deny\"\n",
            Path::new("global"),
        )
        .unwrap();
        assert_eq!(
            config.permissions.tools.get("shell_command"),
            Some(&Permission::Deny)
        );
        assert_eq!(
            config.permissions.tools.get("read_file"),
            Some(&Permission::Allow)
        );
    }

    #[test]
    fn test_project_without_permissions_keeps_global_table() {
        let global = Config::parse(
            "[permissions.tools]\nread_file = \"deny\"\n",
            Path::new("global"),
        )
        .unwrap();
        let project = Config::parse_raw("model = \"gemini/gemini-2.5-pro\"\n", Path::new("project")).unwrap();
        let merged = Config::merge(global, project);
        assert_eq!(
            merged.permissions.tools.get("read_file"),
            Some(&Permission::Deny)
        );
    }

    #[test]
    fn test_load_project_walks_up_to_git_root() {
        let root = std::env::temp_dir().join(format!("aigent_cfg_{}", std::process::id()));
        let nested = root.join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("aigent.toml"), "model = \"gemini/gemini-2.5-pro\"\n").unwrap();

        let found = Config::load_project(&nested).unwrap().unwrap();
        assert_eq!(found.model.as_deref(), Some("gemini/gemini-2.5-pro"));

        std::fs::remove_file(root.join("aigent.toml")).unwrap();
        assert!(Config::load_project(&nested).unwrap().is_none());
        std::fs::remove_dir_all(&root).unwrap();
    }
}
