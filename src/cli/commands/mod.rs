//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod serve;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "loginlens")]
#[command(about = "Detect login forms and OAuth/SSO buttons on web pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "LOGINLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single URL for login surfaces
    Check {
        /// URL to analyze (scheme optional, https assumed)
        url: String,
        /// Print the full JSON report
        #[arg(long)]
        json: bool,
        /// Skip the static fetch and render with the browser
        #[arg(short, long)]
        force_browser: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        bind: String,
    },
}

async fn load_settings(config: Option<PathBuf>) -> anyhow::Result<Settings> {
    match config {
        Some(path) => {
            let settings = Settings::load_from_path(&path)
                .await
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok(settings.with_env_overrides())
        }
        None => Ok(Settings::load().await),
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config).await?;

    match cli.command {
        Commands::Check {
            url,
            json,
            force_browser,
        } => check::cmd_check(&settings, &url, json, force_browser).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["loginlens", "-v", "check", "example.com", "--json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Check {
                url,
                json,
                force_browser,
            } => {
                assert_eq!(url, "example.com");
                assert!(json);
                assert!(!force_browser);
            }
            Commands::Serve { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn test_parse_serve_default_bind() {
        let cli = Cli::try_parse_from(["loginlens", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind, "127.0.0.1:8000"),
            Commands::Check { .. } => panic!("expected serve"),
        }
    }
}
