//! Command-line interface for dashvars.
//!
//! The CLI works on dashboard snapshot files: TOML documents holding variable
//! definitions plus canned query responses (see [`snapshot`]). It is a way
//! to inspect how a dashboard's variables depend on each other and how they
//! resolve, without a live data source.
//!
//! # Commands
//!
//! - `deps` - load order and dependency tree
//! - `keys` - cache key of every query variable
//! - `resolve` - run a session to completion and print every variable
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config` - resolver configuration file (default: see [`ResolverConfig::load`])
//!
//! ```bash
//! dashvars deps dashboard.toml
//! dashvars --verbose resolve dashboard.toml --select region=us
//! ```

mod deps;
mod keys;
mod resolve;
pub mod snapshot;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ResolverConfig;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for tracing; `None` defers to `RUST_LOG`
    pub log_level: Option<String>,

    /// Explicit resolver configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Installs the stderr tracing subscriber. Later calls are no-ops.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Loads the resolver configuration.
    ///
    /// An explicit path must exist; otherwise the environment override and the
    /// default location are tried, falling back to defaults.
    pub async fn resolver_config(&self) -> Result<ResolverConfig> {
        match &self.config_path {
            Some(path) => ResolverConfig::load_from(path).await,
            None => ResolverConfig::load().await,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dashvars", version, about = "Resolve templated dashboard variables")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the resolver configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show variable load order and dependency trees
    Deps(deps::DepsCommand),

    /// Show the cache key of every query variable
    Keys(keys::KeysCommand),

    /// Resolve all variables against the snapshot's fixtures
    Resolve(resolve::ResolveCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Deps(cmd) => cmd.execute().await,
            Commands::Keys(cmd) => cmd.execute(&config.resolver_config().await?).await,
            Commands::Resolve(cmd) => cmd.execute(config.resolver_config().await?).await,
        }
    }
}
