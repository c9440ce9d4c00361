//! Command-line interface definition and session startup.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing::info;

use crate::agent::{Agent, AgentConfig};
use crate::approval::ApprovalGate;
use crate::config::Config;
use crate::console::TerminalConsole;
use crate::constants::{APP_NAME, EXIT_COMMAND};
use crate::provider::{resolve_model, Provider};
use crate::tools::ToolRegistry;

/// Top-level CLI structure for aigent.
#[derive(Parser, Debug)]
#[command(
    name = "aigent",
    version,
    about = "An interactive terminal agent that runs shell and file tools with your approval"
)]
pub struct Cli {
    /// Provider to use (gemini, anthropic, openai, openrouter, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use, optionally as provider/model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Loads config, builds the provider and tools, and runs the session.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let selection = resolve_model(cli.provider.as_deref(), cli.model.as_deref(), &config)?;
    let provider = Provider::from_config(&config, &selection)?;

    let limits = config.limits();
    let tools = ToolRegistry::with_builtins(&limits, config.tools.as_deref())
        .context("Invalid tool configuration")?;
    let gate = ApprovalGate::new(config.permissions.clone());

    info!(
        provider = selection.provider.name(),
        model = %selection.model,
        tools = ?tools.list().iter().map(|t| t.name()).collect::<Vec<_>>(),
        "starting session"
    );

    println!(
        "{} [{}: {}] (type '{}' or Ctrl+D to quit)",
        APP_NAME.bold().cyan(),
        selection.provider.name(),
        provider.model().yellow(),
        EXIT_COMMAND,
    );
    println!();

    let mut agent = Agent::new(
        provider,
        tools,
        gate,
        AgentConfig {
            system_prompt: config.system_prompt.clone(),
            model_name: selection.model.clone(),
            max_tool_rounds: limits.max_tool_rounds,
            model_timeout: Duration::from_secs(limits.model_timeout_secs),
        },
    );

    let mut console = TerminalConsole::new()?;
    let result = agent.run(&mut console).await;
    console.save_history();
    println!("{}", "goodbye.".dimmed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["aigent", "--model", "gemini/gemini-2.5-pro", "-vv"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("gemini/gemini-2.5-pro"));
        assert_eq!(cli.provider, None);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_subcommands() {
        assert!(Cli::try_parse_from(["aigent", "chat"]).is_err());
    }
}
