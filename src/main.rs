//! Entry point for aigent, an interactive terminal agent.
//!
//! Loads `.env`, parses the command line, sets up logging on stderr and
//! starts the interactive session.

mod agent;
mod approval;
mod cli;
mod config;
mod console;
mod constants;
mod diff;
mod format;
mod model;
mod models;
mod provider;
mod schema;
mod tokens;
mod tools;
mod transcript;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli).await
}
