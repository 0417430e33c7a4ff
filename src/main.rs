//! # Trino Release Diff CLI (`trd`)
//!
//! Compares Trino releases by scraping their release notes, caching the
//! result, and attributing changes to connectors.
//!
//! ## Usage
//!
//! ```bash
//! trd --config ./config/trd.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `trd init` | Create the SQLite database and seed known versions |
//! | `trd versions` | List known versions, newest first |
//! | `trd compare <from> <to>` | Breaking changes and new features between two versions |
//! | `trd connector <name>` | Recorded changes for one connector |
//! | `trd serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! trd init --config ./config/trd.toml
//! trd compare 401 406 --config ./config/trd.toml
//! trd compare 406 401 --json --config ./config/trd.toml
//! trd connector Hive --config ./config/trd.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trino_release_diff::{commands, config, logging, migrate, server};

/// Trino Release Diff: breaking changes and new features between Trino
/// releases.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/trd.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "trd",
    about = "Trino Release Diff: breaking changes and new features between Trino releases",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/trd.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and its tables, and seeds the
    /// version list when it is empty. Safe to run repeatedly.
    Init,

    /// List known versions, newest first.
    Versions,

    /// Compare two versions.
    ///
    /// Fetches the release notes of every release after the older version up
    /// to and including the newer one, unless a fresh cached result exists.
    /// The versions may be given in either order.
    Compare {
        /// First version (e.g. `401`).
        from: String,

        /// Second version (e.g. `406`).
        to: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show recorded breaking changes and features for a connector.
    Connector {
        /// Connector name as reported by comparisons (e.g. `Hive`, `SQL Server`).
        name: String,
    },

    /// Start the JSON HTTP API.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Versions => {
            commands::run_versions(&cfg).await?;
        }
        Commands::Compare { from, to, json } => {
            commands::run_compare(&cfg, &from, &to, json).await?;
        }
        Commands::Connector { name } => {
            commands::run_connector(&cfg, &name).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
