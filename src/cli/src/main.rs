//! Storynest client core - diagnostic binary
//!
//! Drives the access and listing controllers from the command line:
//! - Permission lattice inspection
//! - Route guard decisions for synthetic identities
//! - Pagination and infinite-scroll walkthroughs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod commands;
mod config;

use config::AppConfig;

/// Storynest CLI
#[derive(Parser)]
#[command(name = "storynest")]
#[command(about = "Storynest client core - access control and listing diagnostics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "storynest.toml", env = "STORYNEST_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the permission table and print grants per role
    Lattice,

    /// Evaluate the route guard for one location
    Guard {
        /// Location to evaluate, e.g. /editor/stories?draft=1
        #[arg(long)]
        path: String,

        /// Role held by the signed-in identity
        #[arg(long, conflicts_with = "anonymous")]
        role: Option<String>,

        /// Evaluate as a signed-out visitor
        #[arg(long)]
        anonymous: bool,

        /// Pretend authentication has not settled yet
        #[arg(long)]
        auth_loading: bool,

        /// Pretend the role lookup has not settled yet
        #[arg(long)]
        role_loading: bool,

        /// Time since the guard was activated
        #[arg(long, default_value_t = 0)]
        elapsed_ms: u64,

        /// Make the role lookup fail
        #[arg(long)]
        fail_lookup: bool,
    },

    /// Show one page of a synthetic collection
    Paginate {
        /// Collection size
        #[arg(long)]
        total: usize,

        /// Items per page (defaults to listing.page_size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Page to select, clamped to the valid range
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Scroll a synthetic collection to the bottom repeatedly
    Scroll {
        /// Collection size
        #[arg(long)]
        total: usize,

        /// Items revealed per step (defaults to listing.page_size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Number of near-bottom signals to send
        #[arg(long)]
        steps: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)?;

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Storynest CLI v{}", env!("CARGO_PKG_VERSION"));
    if cli.config.exists() {
        info!("Loaded configuration from {:?}", cli.config);
    } else {
        info!("No configuration at {:?}, using defaults", cli.config);
    }

    config.validate()?;

    let output = match cli.command {
        Command::Lattice => commands::lattice(&config)?,
        Command::Guard {
            path,
            role,
            anonymous,
            auth_loading,
            role_loading,
            elapsed_ms,
            fail_lookup,
        } => {
            let options = commands::GuardOptions {
                path,
                role,
                anonymous,
                auth_loading,
                role_loading,
                elapsed_ms,
                fail_lookup,
            };
            commands::guard(&config, options).await?
        }
        Command::Paginate { total, page_size, page } => {
            commands::paginate(&config, total, page_size, page)?
        }
        Command::Scroll { total, page_size, steps } => {
            commands::scroll(&config, total, page_size, steps).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
