//! Terminal I/O for the agent loop.
//!
//! The orchestrator and the approval gate only talk to a [`Console`], so
//! tests can drive a whole session with scripted input.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::config::Config;
use crate::constants::HISTORY_FILENAME;

/// Answer to a yes/no/always confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    /// Yes, and stop asking for this tool for the rest of the session.
    Always,
}

impl Confirmation {
    /// Parse a typed answer. Anything unrecognised counts as no.
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Yes,
            "a" | "always" => Confirmation::Always,
            _ => Confirmation::No,
        }
    }
}

pub trait Console {
    /// Read one line of user input. `None` means end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn print(&mut self, text: &str);

    fn print_error(&mut self, text: &str);

    /// Ask a yes/no/always question.
    fn confirm(&mut self, question: &str) -> Result<Confirmation>;

    /// Ask a free-form question. An empty answer or end of input is `None`.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

/// [`Console`] backed by rustyline, with history kept in the cache directory.
pub struct TerminalConsole {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl TerminalConsole {
    pub fn new() -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = Config::cache_dir().ok().map(|d| d.join(HISTORY_FILENAME));
        if let Some(ref path) = history_path {
            if path.exists() {
                let _ = editor.load_history(path);
            }
        }
        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Persist readline history. Failures are logged, not fatal.
    pub fn save_history(&mut self) {
        let Some(ref path) = self.history_path else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "could not create history directory");
                return;
            }
        }
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!(error = %e, "could not save history");
        }
    }

    /// Raw line read without adding to history. Ctrl+C yields an empty line.
    fn read_raw(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let line = self.read_raw(&format!("{} ", prompt.green().bold()))?;
        if let Some(ref text) = line {
            if !text.trim().is_empty() {
                let _ = self.editor.add_history_entry(text.as_str());
            }
        }
        Ok(line)
    }

    fn print(&mut self, text: &str) {
        println!("{}", text);
    }

    fn print_error(&mut self, text: &str) {
        eprintln!("{} {}", "error:".red().bold(), text);
    }

    fn confirm(&mut self, question: &str) -> Result<Confirmation> {
        let prompt = format!(
            "{} {} ",
            question.bold(),
            "[y]es / [n]o / [a]lways:".dimmed()
        );
        Ok(self
            .read_raw(&prompt)?
            .map(|answer| Confirmation::parse(&answer))
            .unwrap_or(Confirmation::No))
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let answer = self.read_raw(&format!("{} ", question.bold()))?;
        Ok(answer
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_parse() {
        assert_eq!(Confirmation::parse("y"), Confirmation::Yes);
        assert_eq!(Confirmation::parse(" YES "), Confirmation::Yes);
        assert_eq!(Confirmation::parse("a"), Confirmation::Always);
        assert_eq!(Confirmation::parse("always"), Confirmation::Always);
        assert_eq!(Confirmation::parse("n"), Confirmation::No);
        assert_eq!(Confirmation::parse(""), Confirmation::No);
        assert_eq!(Confirmation::parse("maybe"), Confirmation::No);
    }
}
