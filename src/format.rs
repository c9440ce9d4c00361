//! Terminal rendering of model text and tool activity.

use colored::Colorize;

use crate::transcript::ToolOutcome;

/// Maximum characters of a tool result echoed to the terminal.
const OUTCOME_PREVIEW_CHARS: usize = 300;

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the three most common patterns
/// in LLM output: bold, inline code, and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            if in_code_block {
                in_code_block = false;
            } else {
                in_code_block = true;
                let lang = line.trim_start().trim_start_matches('`');
                if !lang.is_empty() {
                    output.push_str(&format!("  {}\n", lang.dimmed()));
                }
            }
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.cyan()));
        } else {
            output.push_str(&render_inline(line));
            output.push('\n');
        }
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**") {
                result.push_str(&after[..end].bold().to_string());
                rest = &after[end + 2..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                result.push_str(&after[..end].cyan().to_string());
                rest = &after[end + 1..];
                continue;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            result.push(c);
        }
        rest = chars.as_str();
    }

    result
}

/// One dimmed line announcing a tool call that is about to run.
pub fn tool_start(prompt: &str) -> String {
    format!("{} {}", "▸".cyan(), prompt.dimmed())
}

/// Short summary of a tool outcome for the terminal.
pub fn tool_outcome(tool_name: &str, outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Success { output } => {
            let text = output.to_string();
            format!(
                "{} {} {}",
                "✓".green(),
                tool_name.bold(),
                truncate(&text, OUTCOME_PREVIEW_CHARS).dimmed()
            )
        }
        ToolOutcome::Failure { error } => {
            format!("{} {} {}", "✗".red(), tool_name.bold(), error.red())
        }
        ToolOutcome::Denied { .. } => format!("{} {} denied", "✗".yellow(), tool_name.bold()),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_inline_markers_are_stripped() {
        plain();
        assert_eq!(render_markdown_lite("a **b** `c` d"), "a b c d");
    }

    #[test]
    fn test_unclosed_markers_are_kept() {
        plain();
        assert_eq!(render_markdown_lite("2 * 3 and `x"), "2 * 3 and `x");
        assert_eq!(render_markdown_lite("*"), "*");
    }

    #[test]
    fn test_code_block_is_indented() {
        plain();
        let out = render_markdown_lite("before\n```rust\nlet x = 1;\n```\nafter");
        assert_eq!(out, "before\n  rust\n  let x = 1;\nafter");
    }

    #[test]
    fn test_tool_outcome_lines() {
        plain();
        let ok = tool_outcome("read_file", &ToolOutcome::Success { output: json!({"content": "hi"}) });
        assert!(ok.contains("read_file"));
        assert!(ok.contains("\"content\":\"hi\""));
        let err = tool_outcome("shell_command", &ToolOutcome::failure("boom"));
        assert!(err.ends_with("boom"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
