//! # gallery-sync
//!
//! One-way photo gallery synchronization between directory trees.
//!
//! ## Commands
//!
//! - `sync`: Make the target gallery match the source gallery
//! - `diff`: Show what `sync` would do, without changing anything
//! - `list`: List the albums of a gallery in display order
//! - `init-config`: Write a default configuration file
//!
//! ## Example
//!
//! ```bash
//! # Preview, then run a pass
//! gallery-sync diff --source ~/Pictures/albums --target /mnt/nas/albums
//! gallery-sync sync --source ~/Pictures/albums --target /mnt/nas/albums
//!
//! # Keep going past failures, eight uploads at a time
//! gallery-sync sync --source a --target b --best-effort --concurrency 8
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{diff, init_config, list, sync};
use config::Config;

/// One-way photo gallery synchronization.
#[derive(Parser, Debug)]
#[command(name = "gallery-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Make the target gallery match the source gallery
    Sync {
        /// Source gallery directory
        #[arg(long, short)]
        source: PathBuf,

        /// Target gallery directory (created if missing)
        #[arg(long, short)]
        target: PathBuf,

        /// Operations dispatched at once
        #[arg(long, short = 'j')]
        concurrency: Option<usize>,

        /// Keep going after a failed operation
        #[arg(long)]
        best_effort: bool,

        /// Abandon the pass after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show what sync would do, without changing anything
    Diff {
        /// Source gallery directory
        #[arg(long, short)]
        source: PathBuf,

        /// Target gallery directory
        #[arg(long, short)]
        target: PathBuf,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the albums of a gallery in display order
    List {
        /// Gallery directory
        dir: PathBuf,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // init-config must work even when the existing file is broken
    let config = match &cli.command {
        Commands::InitConfig { .. } => Config::default(),
        _ => Config::load(cli.config.as_deref()).context("Failed to load configuration")?,
    };
    init_tracing(&config.logging.level, cli.verbose);

    match cli.command {
        Commands::Sync {
            source,
            target,
            concurrency,
            best_effort,
            timeout,
        } => {
            let options = sync::resolve(
                config.sync_config(),
                config.sync.timeout_secs,
                concurrency,
                best_effort,
                timeout,
            );
            sync::run(&source, &target, options).await?;
        }
        Commands::Diff {
            source,
            target,
            json,
        } => {
            diff::run(&source, &target, json).await?;
        }
        Commands::List { dir, json } => {
            list::run(&dir, json).await?;
        }
        Commands::InitConfig { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => config::default_config_path()
                    .context("Could not determine config directory")?,
            };
            init_config::run(&path, force)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the config file.
fn init_tracing(level: &str, verbose: bool) {
    let default = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
