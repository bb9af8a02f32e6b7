//! # simrec CLI
//!
//! The `simrec` binary is the primary interface for the recommendation
//! service. It provides commands for database initialization, model
//! training, ad-hoc recommendation queries, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! simrec --config ./config/simrec.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `simrec init` | Create the SQLite database and run schema migrations |
//! | `simrec train` | Build the TF-IDF model from the catalog and persist it |
//! | `simrec recommend <item-id>` | Items most similar to a catalog item |
//! | `simrec keywords "<query>"` | Items most similar to a free-text query |
//! | `simrec category <id>` | Aggregated recommendations for a category |
//! | `simrec group <id>` | Aggregated recommendations for a product group |
//! | `simrec serve` | Start the HTTP API server |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! simrec init --config ./config/simrec.toml
//!
//! # Train the model
//! simrec train --config ./config/simrec.toml
//!
//! # Ten items most similar to item 42
//! simrec recommend 42 --k 10 --config ./config/simrec.toml
//!
//! # Keyword query
//! simrec keywords "nước mắm truyền thống" --config ./config/simrec.toml
//!
//! # Start the HTTP server
//! simrec serve --config ./config/simrec.toml
//! ```

mod catalog_csv;
mod catalog_db;
mod config;
mod db;
mod engine;
mod migrate;
mod model_file;
mod query;
mod scheduler;
mod server;
mod train;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// simrec CLI — a content-based catalog recommendation service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/simrec.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "simrec",
    about = "simrec — content-based catalog recommendations over TF-IDF and cosine similarity",
    version,
    long_about = "simrec builds a TF-IDF vector space over catalog item content (name, \
    description, price bucket, group, city, star rating, keywords, categories) and serves \
    cosine-similarity recommendations via a CLI and a JSON HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/simrec.toml`. Database, catalog, model, and
    /// server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/simrec.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (products, product_groups, categories, product_categories, images).
    /// This command is idempotent — running it multiple times is safe.
    Init,

    /// Train the recommendation model.
    ///
    /// Reads every active item from the configured catalog source, builds
    /// the TF-IDF index, and persists the snapshot to `[model].path`.
    Train,

    /// Recommend items similar to a catalog item.
    Recommend {
        /// Catalog item id.
        item_id: i64,

        /// Maximum number of results (defaults to `[recommend].default_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Recommend items matching a free-text keyword query.
    Keywords {
        /// The query string.
        query: String,

        /// Maximum number of results (defaults to `[recommend].default_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Aggregated recommendations across all items of a category.
    Category {
        /// Category id.
        category_id: i64,

        /// Maximum number of results (defaults to `[recommend].default_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Aggregated recommendations across all items of a product group.
    Group {
        /// Product group id.
        group_id: i64,

        /// Maximum number of results (defaults to `[recommend].default_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Start the HTTP API server.
    ///
    /// Binds to `[server].bind` and, when `[scheduler].enabled` is set,
    /// spawns the periodic model refresh task.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Train => {
            train::run_train(&cfg).await?;
        }
        Commands::Recommend { item_id, k } => {
            query::run_item(&cfg, item_id, k).await?;
        }
        Commands::Keywords { query, k } => {
            query::run_keywords(&cfg, &query, k).await?;
        }
        Commands::Category { category_id, k } => {
            query::run_category(&cfg, category_id, k).await?;
        }
        Commands::Group { group_id, k } => {
            query::run_group(&cfg, group_id, k).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
