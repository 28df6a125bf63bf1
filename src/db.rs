//! Database connection helpers.
//!
//! The import source is always a local SQLite file, opened read-only — the
//! importer must never mutate it. The destination is addressed by DSN
//! through sqlx's `Any` driver, so the production Postgres URL and the
//! SQLite files used in tests go through the same code path.

use anyhow::Result;
use sqlx::any::AnyPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::AnyPool;
use std::path::Path;
use std::str::FromStr;
use std::sync::Once;

static DRIVERS: Once = Once::new();

/// Opens the source backtest database in read-only mode.
pub async fn open_source(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Connects to the destination store. The DSN scheme selects the driver.
pub async fn connect_destination(dsn: &str) -> Result<AnyPool> {
    DRIVERS.call_once(sqlx::any::install_default_drivers);

    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(dsn)
        .await?;

    Ok(pool)
}
