//! Approval gate: decides whether a tool call may run.
//!
//! Each tool has a permission (`allow`, `ask` or `deny`) from config. Shell
//! commands can additionally match wildcard patterns such as `"git *"`.
//! Answering "always" at a prompt allows the tool for the rest of the session.

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::console::{Confirmation, Console};
use crate::tools::Tool;

/// Name of the tool whose commands are matched against `shell_commands`.
const SHELL_TOOL: &str = "shell_command";

/// Permission level for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Allow,
    Ask,
    Deny,
}

/// Configuration for the permission system.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PermissionConfig {
    /// Per-tool permissions: tool_name -> Permission
    #[serde(default)]
    pub tools: HashMap<String, Permission>,

    /// Per-command permissions for the shell tool: command_pattern -> Permission
    #[serde(default)]
    pub shell_commands: HashMap<String, Permission>,
}

impl PermissionConfig {
    /// `read_file` runs freely, everything else asks.
    pub fn with_defaults() -> Self {
        let mut tools = HashMap::new();
        tools.insert("read_file".into(), Permission::Allow);
        tools.insert("write_file".into(), Permission::Ask);
        tools.insert(SHELL_TOOL.into(), Permission::Ask);
        Self {
            tools,
            shell_commands: HashMap::new(),
        }
    }
}

/// The gate's verdict for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Approval {
    Approved,
    Denied { clarification: Option<String> },
}

pub struct ApprovalGate {
    config: PermissionConfig,
    /// Tools the user answered "always" for.
    session_overrides: HashMap<String, Permission>,
}

impl ApprovalGate {
    pub fn new(config: PermissionConfig) -> Self {
        Self {
            config,
            session_overrides: HashMap::new(),
        }
    }

    /// Permission that applies to this call, before any prompting.
    ///
    /// A configured `deny` (for the tool or a matching shell pattern) holds
    /// even after the user answered "always" for that tool.
    pub fn check(&self, tool_name: &str, arguments: &Value) -> Permission {
        let pattern = if tool_name == SHELL_TOOL {
            arguments
                .get("command")
                .and_then(Value::as_str)
                .and_then(|command| self.match_shell_command(command))
        } else {
            None
        };
        let configured = self.config.tools.get(tool_name).copied();

        if pattern == Some(Permission::Deny) || configured == Some(Permission::Deny) {
            return Permission::Deny;
        }
        if let Some(perm) = self.session_overrides.get(tool_name) {
            return *perm;
        }
        pattern.or(configured).unwrap_or(Permission::Ask)
    }

    /// The longest matching pattern wins so `"git push *"` can override `"git *"`.
    fn match_shell_command(&self, command: &str) -> Option<Permission> {
        let command = command.trim();
        self.config
            .shell_commands
            .iter()
            .filter(|(pattern, _)| wildcard_match(pattern, command))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, perm)| *perm)
    }

    /// Decide whether `tool` may run with `arguments`.
    ///
    /// Allowed calls never touch the console. Denied-by-config calls are
    /// refused without prompting. Otherwise the preview (if any) and `prompt`
    /// are shown and the user is asked; on "no" an optional clarification
    /// is collected for the model.
    pub fn decide(
        &mut self,
        console: &mut dyn Console,
        tool: &dyn Tool,
        arguments: &Value,
        prompt: &str,
    ) -> Result<Approval> {
        match self.check(tool.name(), arguments) {
            Permission::Allow => {
                debug!(tool = tool.name(), "allowed without confirmation");
                Ok(Approval::Approved)
            }
            Permission::Deny => {
                info!(tool = tool.name(), "denied by configuration");
                console.print(&format!(
                    "{} {}",
                    "denied:".red().bold(),
                    prompt.dimmed()
                ));
                Ok(Approval::Denied {
                    clarification: Some(format!(
                        "The tool '{}' is disabled by configuration.",
                        tool.name()
                    )),
                })
            }
            Permission::Ask => {
                if let Some(preview) = tool.preview(arguments) {
                    console.print(&preview);
                }
                console.print(&format!("{} {}", "?".yellow().bold(), prompt));
                match console.confirm("Allow?")? {
                    Confirmation::Yes => Ok(Approval::Approved),
                    Confirmation::Always => {
                        info!(tool = tool.name(), "allowed for the rest of the session");
                        self.session_overrides
                            .insert(tool.name().to_string(), Permission::Allow);
                        Ok(Approval::Approved)
                    }
                    Confirmation::No => {
                        let clarification =
                            console.ask("Why not? (optional, Enter to skip):")?;
                        Ok(Approval::Denied { clarification })
                    }
                }
            }
        }
    }
}

/// Simple wildcard matching: "git *" matches "git status", "git push", etc.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix(" *") {
        text == prefix || text.starts_with(&format!("{prefix} "))
    } else {
        pattern == text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::read_file::ReadFileTool;
    use crate::tools::shell_command::ShellCommandTool;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Console that replays canned answers and counts confirmations.
    #[derive(Default)]
    struct FakeConsole {
        confirms: VecDeque<Confirmation>,
        answers: VecDeque<Option<String>>,
        confirm_calls: usize,
        printed: Vec<String>,
    }

    impl Console for FakeConsole {
        fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn print(&mut self, text: &str) {
            self.printed.push(text.to_string());
        }
        fn print_error(&mut self, text: &str) {
            self.printed.push(text.to_string());
        }
        fn confirm(&mut self, _question: &str) -> Result<Confirmation> {
            self.confirm_calls += 1;
            Ok(self.confirms.pop_front().unwrap_or(Confirmation::No))
        }
        fn ask(&mut self, _question: &str) -> Result<Option<String>> {
            Ok(self.answers.pop_front().flatten())
        }
    }

    fn shell() -> ShellCommandTool {
        ShellCommandTool::new(30, 1024)
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("git *", "git status"));
        assert!(wildcard_match("git *", "git"));
        assert!(!wildcard_match("git *", "gitk"));
        assert!(wildcard_match("ls", "ls"));
        assert!(!wildcard_match("ls", "ls -la"));
    }

    #[test]
    fn test_defaults() {
        let gate = ApprovalGate::new(PermissionConfig::with_defaults());
        assert_eq!(gate.check("read_file", &json!({})), Permission::Allow);
        assert_eq!(gate.check("write_file", &json!({})), Permission::Ask);
        assert_eq!(gate.check("shell_command", &json!({})), Permission::Ask);
        assert_eq!(gate.check("unlisted", &json!({})), Permission::Ask);
    }

    #[test]
    fn test_shell_patterns_longest_wins() {
        let mut config = PermissionConfig::with_defaults();
        config
            .shell_commands
            .insert("git *".into(), Permission::Allow);
        config
            .shell_commands
            .insert("git push *".into(), Permission::Deny);
        let gate = ApprovalGate::new(config);
        let check = |cmd: &str| gate.check("shell_command", &json!({ "command": cmd }));
        assert_eq!(check("git status"), Permission::Allow);
        assert_eq!(check("git push origin main"), Permission::Deny);
        assert_eq!(check("rm -rf /"), Permission::Ask);
    }

    #[test]
    fn test_allowed_tool_never_prompts() {
        let mut gate = ApprovalGate::new(PermissionConfig::with_defaults());
        let mut console = FakeConsole::default();
        let tool = ReadFileTool::new(10);
        let verdict = gate
            .decide(&mut console, &tool, &json!({"path": "x"}), "Read file x.")
            .unwrap();
        assert_eq!(verdict, Approval::Approved);
        assert_eq!(console.confirm_calls, 0);
        assert!(console.printed.is_empty());
    }

    #[test]
    fn test_denied_by_config_never_prompts() {
        let mut config = PermissionConfig::default();
        config.tools.insert("shell_command".into(), Permission::Deny);
        let mut gate = ApprovalGate::new(config);
        let mut console = FakeConsole::default();
        let verdict = gate
            .decide(&mut console, &shell(), &json!({"command": "ls"}), "Execute shell command `ls`.")
            .unwrap();
        assert!(matches!(verdict, Approval::Denied { clarification: Some(_) }));
        assert_eq!(console.confirm_calls, 0);
    }

    #[test]
    fn test_no_collects_clarification() {
        let mut gate = ApprovalGate::new(PermissionConfig::with_defaults());
        let mut console = FakeConsole {
            confirms: VecDeque::from([Confirmation::No]),
            answers: VecDeque::from([Some("too risky".to_string())]),
            ..Default::default()
        };
        let verdict = gate
            .decide(&mut console, &shell(), &json!({"command": "rm x"}), "Execute shell command `rm x`.")
            .unwrap();
        assert_eq!(
            verdict,
            Approval::Denied {
                clarification: Some("too risky".into())
            }
        );
        assert!(console.printed.iter().any(|l| l.contains("rm x")));
    }

    #[test]
    fn test_always_sets_session_override() {
        let mut gate = ApprovalGate::new(PermissionConfig::with_defaults());
        let mut console = FakeConsole {
            confirms: VecDeque::from([Confirmation::Always]),
            ..Default::default()
        };
        let args = json!({"command": "ls"});
        assert_eq!(
            gate.decide(&mut console, &shell(), &args, "p").unwrap(),
            Approval::Approved
        );
        assert_eq!(
            gate.decide(&mut console, &shell(), &args, "p").unwrap(),
            Approval::Approved
        );
        assert_eq!(console.confirm_calls, 1);
    }

    #[test]
    fn test_always_does_not_lift_denied_patterns() {
        let mut config = PermissionConfig::with_defaults();
        config
            .shell_commands
            .insert("git push *".into(), Permission::Deny);
        let mut gate = ApprovalGate::new(config);
        let mut console = FakeConsole {
            confirms: VecDeque::from([Confirmation::Always]),
            ..Default::default()
        };
        assert_eq!(
            gate.decide(&mut console, &shell(), &json!({"command": "ls"}), "p").unwrap(),
            Approval::Approved
        );

        let push = json!({"command": "git push origin main"});
        assert_eq!(gate.check("shell_command", &push), Permission::Deny);
        let verdict = gate.decide(&mut console, &shell(), &push, "p").unwrap();
        assert!(matches!(verdict, Approval::Denied { clarification: Some(_) }));
        assert_eq!(console.confirm_calls, 1);
        assert_eq!(
            gate.check("shell_command", &json!({"command": "cargo fmt"})),
            Permission::Allow
        );
    }
}
