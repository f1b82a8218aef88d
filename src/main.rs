//! # wikiseek CLI
//!
//! ## Usage
//!
//! ```bash
//! wikiseek --config ./config/wikiseek.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wikiseek init` | Create the SQLite database and tables |
//! | `wikiseek terms` | Print the terms found in the search log |
//! | `wikiseek ingest [--sync]` | Fetch and store pages for new terms |
//! | `wikiseek sync` | Rebuild the search index from the page store |
//! | `wikiseek search "<query>"` | Search stored pages |
//! | `wikiseek serve` | Start the HTTP query server |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wikiseek::{config, ingest, migrate, search, server, sync};

/// Search-log driven encyclopedia ingestion and search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/wikiseek.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "wikiseek",
    about = "Search-log driven encyclopedia ingestion and search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/wikiseek.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Print the unique normalized terms found in the search log.
    Terms {
        /// Read this log instead of `[ingest].log_path`.
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Run one ingestion pass over the search log.
    ///
    /// Terms already in the ledger are skipped. Each remaining term is
    /// resolved against the configured languages in order and the first
    /// article found is stored.
    Ingest {
        /// Read this log instead of `[ingest].log_path`.
        #[arg(long)]
        log: Option<PathBuf>,

        /// Rebuild the search index afterwards if new pages were stored.
        #[arg(long)]
        sync: bool,
    },

    /// Delete, recreate and reload the search index from the page store.
    Sync,

    /// Search stored pages.
    Search {
        /// The search query string.
        query: String,
    },

    /// Start the HTTP query server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Terms { log } => {
            ingest::run_terms(&cfg, log)?;
        }
        Commands::Ingest { log, sync } => {
            ingest::run_ingest(&cfg, log, sync).await?;
        }
        Commands::Sync => {
            sync::run_sync(&cfg).await?;
        }
        Commands::Search { query } => {
            search::run_search(&cfg, &query).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
