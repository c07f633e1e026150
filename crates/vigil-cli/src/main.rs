//! Vigil CLI - ask questions about a workspace, approve the commands the
//! agent proposes, or serve the HTTP approval surface.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod theme;

use commands::ask::ApprovalMode;
use commands::{ask, providers, serve};

/// Vigil - a workspace agent that asks before it runs anything
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file merged over the user config
    #[arg(short, long, global = true, env = "VIGIL_CONFIG")]
    config: Option<PathBuf>,

    /// Workspace root (defaults to the configured root, then the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Listen address, overriding the config
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Ask one question and review any proposed commands
    Ask {
        /// The question or instruction
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Print the turn as JSON and do not prompt
        #[arg(long)]
        json: bool,

        /// List proposed commands without prompting
        #[arg(long)]
        no_prompt: bool,
    },

    /// List model providers in fallback order
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = vigil_config::Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let cfg = loaded.config;

    if let Err(e) = vigil_telemetry::setup_logging(&config_bridge::to_log_config(&cfg, cli.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
    }
    for path in &loaded.loaded_files {
        tracing::debug!(path = %path.display(), "config layer");
    }

    match cli.command {
        Commands::Serve { bind } => {
            let root = config_bridge::resolve_workspace(&cfg, cli.workspace.as_deref())?;
            serve::run_server(&cfg, root, bind.as_deref()).await?;
        },
        Commands::Ask {
            message,
            json,
            no_prompt,
        } => {
            let root = config_bridge::resolve_workspace(&cfg, cli.workspace.as_deref())?;
            let runtime = config_bridge::build_runtime(&cfg, root);
            let mode = if no_prompt || json {
                ApprovalMode::Skip
            } else {
                ApprovalMode::Prompt
            };
            ask::run_ask(&runtime, &message.join(" "), json, mode).await?;
        },
        Commands::Providers => {
            providers::list_providers(&cfg);
        },
    }

    Ok(())
}
