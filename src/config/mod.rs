//! Configuration types and path resolution for aigent.
//!
//! Settings are TOML, stored at the platform's XDG config path
//! (e.g. `~/.config/aigent/config.toml` on Linux) with an optional
//! per-project `aigent.toml` layered on top.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::{Config, Limits};

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates the global config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project(&std::env::current_dir()?)?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}
