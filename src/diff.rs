//! Colored previews of what a `write_file` call would change.
//!
//! The approval gate prints one of these above the confirmation prompt so the
//! user sees the edit, not only the target path.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

/// Unified diff (3 lines of context) between the current and proposed file,
/// followed by an added/removed line count. Identical content yields a
/// single "no changes" line.
pub fn unified_diff(old: &str, new: &str, path: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut body = String::new();
    let (mut added, mut removed) = (0usize, 0usize);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        body.push_str(&hunk.header().to_string().cyan().to_string());
        body.push('\n');
        for change in hunk.iter_changes() {
            let line = change.to_string_lossy();
            let line = line.trim_end_matches('\n');
            match change.tag() {
                ChangeTag::Delete => {
                    removed += 1;
                    body.push_str(&format!("-{line}").red().to_string());
                }
                ChangeTag::Insert => {
                    added += 1;
                    body.push_str(&format!("+{line}").green().to_string());
                }
                ChangeTag::Equal => body.push_str(&format!(" {line}")),
            }
            body.push('\n');
        }
    }

    if added == 0 && removed == 0 {
        return format!("{} {}", path.bold(), "(no changes)".dimmed());
    }

    format!(
        "--- a/{path}\n+++ b/{path}\n{body}{}",
        format!("{added} added, {removed} removed").dimmed()
    )
}

/// Preview for a file that does not exist yet: every line is an addition.
pub fn new_file_preview(content: &str, path: &str) -> String {
    let mut out = format!("--- /dev/null\n+++ b/{path}\n");
    let mut lines = 0usize;
    for line in content.lines() {
        lines += 1;
        out.push_str(&format!("+{line}").green().to_string());
        out.push('\n');
    }
    out.push_str(&format!("new file, {lines} lines").dimmed().to_string());
    out
}
