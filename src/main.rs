//! # DeskOps CLI (`deskops`)
//!
//! Operations entry point for the gulfchain desk: builds the documentation
//! metadata index and copies backtest tables into the destination store.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `deskops index` | Build `docs_index.json` from the documentation trees |
//! | `deskops import` | Copy backtest tables from SQLite into the destination |
//! | `deskops serve` | Start the HTTP service |
//!
//! ## Examples
//!
//! ```bash
//! # Rebuild the docs index in place
//! GULFCHAIN_ROOT=~/gulfchain deskops index
//!
//! # Preview without writing
//! deskops index --dry-run
//!
//! # One-shot import, capped at 1000 rows per table
//! deskops import --sqlite /data/backtests.sqlite \
//!     --pg postgres://postgres@127.0.0.1:5432/deskops --limit 1000
//!
//! # Serve the import endpoint
//! deskops serve --config ./config/deskops.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use deskops::{config, import, index, server};

/// DeskOps — docs index builder and backtest table importer for the
/// gulfchain desk.
#[derive(Parser)]
#[command(
    name = "deskops",
    about = "DeskOps — docs index builder and backtest table importer",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// A missing file is not an error; built-in defaults apply.
    #[arg(long, global = true, default_value = "./config/deskops.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation metadata index.
    ///
    /// Scans the fixed documentation directories under the gulfchain root,
    /// merges with any existing index (curated fields survive), and writes
    /// the combined JSON document back out.
    Index {
        /// Override the gulfchain root (takes precedence over GULFCHAIN_ROOT
        /// and the config file).
        #[arg(long)]
        root: Option<PathBuf>,

        /// Compute the index without writing any files.
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy backtest tables from SQLite into the destination store.
    ///
    /// Reads the source read-only, skips tables absent in the source, and
    /// drops duplicate-key rows silently. Commits once at the end.
    Import {
        /// Source SQLite database path.
        #[arg(long)]
        sqlite: Option<PathBuf>,

        /// Destination DSN.
        #[arg(long)]
        pg: Option<String>,

        /// Maximum rows per table (0 = unbounded).
        #[arg(long, default_value_t = 0)]
        limit: i64,
    },

    /// Start the HTTP service.
    ///
    /// Binds to `service.bind` and exposes `GET /health` and
    /// `POST /v1/import/backtests`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Index { root, dry_run } => {
            let root = root.unwrap_or_else(|| cfg.index.root.clone());
            let index_path = root.join(&cfg.index.output);
            let output = index::build_docs_index(&root, &index_path, dry_run)?;
            println!("Docs index items: {}", output.items.len());
            if dry_run {
                println!("Dry run: no files written.");
            } else {
                println!("Wrote: {}", index_path.display());
            }
        }
        Commands::Import { sqlite, pg, limit } => {
            let sqlite = sqlite.unwrap_or_else(|| cfg.backtests.sqlite_path.clone());
            let pg = pg.unwrap_or_else(|| cfg.database.url.clone());
            let limit = (limit > 0).then_some(limit);
            let imported = import::import_sqlite_to_postgres(&sqlite, &pg, limit).await?;
            println!("Imported tables: {}", imported.join(", "));
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
