//! # wallfeed
//!
//! CLI tool for exercising wallfeed pagination and reconciliation against
//! an in-process demo backend.
//!
//! ## Commands
//!
//! - `history`: Page through a conversation, optionally sending a wallpaper
//! - `friends`: Show friend and request lists, optionally applying actions
//!
//! ## Example
//!
//! ```bash
//! # Page through the whole conversation with user 2
//! wallfeed history --peer 2
//!
//! # Send a wallpaper, then see it confirmed under a server id
//! wallfeed history --peer 2 --send wallpapers/sunset.jpg --caption "for you"
//!
//! # Block user 2 and print both lists as JSON
//! wallfeed --json friends --act block:2
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wallfeed_client::FeedConfig;

mod backend;
mod commands;

use commands::{friends, history};

/// CLI tool for exercising wallfeed pagination and reconciliation.
#[derive(Parser, Debug)]
#[command(name = "wallfeed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (default: wallfeed.toml in the user
    /// config directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Id of the local user
    #[arg(long, global = true, default_value = "1")]
    me: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Page through the conversation with a peer
    History {
        /// Id of the other participant
        #[arg(long, default_value = "2")]
        peer: u64,

        /// Number of messages the demo backend holds
        #[arg(long, default_value = "45")]
        seed: u64,

        /// Stop after this many pages (default: until end-of-data)
        #[arg(long)]
        pages: Option<usize>,

        /// Send a wallpaper (image reference) before paging again
        #[arg(long)]
        send: Option<String>,

        /// Caption for --send
        #[arg(long, requires = "send")]
        caption: Option<String>,
    },

    /// Show friend and request lists
    Friends {
        /// Apply an action as ACTION:PEER (e.g. accept:101); repeatable
        #[arg(long = "act", value_parser = friends::parse_step)]
        steps: Vec<friends::Step>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let me = wallfeed_types::UserId::new(cli.me);

    match cli.command {
        Commands::History {
            peer,
            seed,
            pages,
            send,
            caption,
        } => {
            let args = history::HistoryArgs {
                me,
                peer: wallfeed_types::UserId::new(peer),
                seed,
                pages,
                send,
                caption,
            };
            history::run(&config, &args, cli.json).await?;
        }
        Commands::Friends { steps } => {
            friends::run(&config, me, &steps, cli.json).await?;
        }
    }

    Ok(())
}

/// Load the explicit config file, else the user's default one, else defaults.
fn load_config(path: Option<&Path>) -> Result<FeedConfig> {
    if let Some(path) = path {
        return FeedConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "using default config file");
            FeedConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        _ => Ok(FeedConfig::default()),
    }
}

/// Get the default config file location for wallfeed.
fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "wallfeed", "wallfeed")
        .map(|dirs| dirs.config_dir().join("wallfeed.toml"))
}
