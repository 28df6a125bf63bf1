//! Backtest table importer.
//!
//! Copies a fixed, ordered list of tables from a read-only SQLite backtest
//! database into the destination relational store. Tables absent in the
//! source are skipped silently. Each row is inserted with an explicit
//! `ON CONFLICT DO NOTHING`, so duplicate-key rows are dropped rather than
//! reported. The destination transaction commits exactly once, after all
//! tables — a failure partway through leaves the destination untouched.
//!
//! There are no retries and no per-table recovery; any database error
//! other than the ignored conflict case aborts the run.

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};
use std::path::Path;

use crate::db;

/// Tables copied by an import run, in order.
pub const TABLES: [&str; 8] = [
    "runs",
    "signals",
    "trades",
    "trades_pass",
    "gate_decisions",
    "gate_metrics",
    "gate_daily_stats",
    "trades_legacy",
];

/// Rows fetched from the source per batch, to bound memory.
const BATCH_SIZE: i64 = 500;

/// A SQLite storage-class value carried from source to destination.
#[derive(Debug, Clone)]
enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Copies every table in [`TABLES`] that exists in the source into the
/// destination, honoring the optional per-table row `limit` (absent or
/// non-positive means unbounded). Returns the table names actually
/// imported, in [`TABLES`] order.
pub async fn import_sqlite_to_postgres(
    sqlite_path: &Path,
    destination_dsn: &str,
    limit: Option<i64>,
) -> Result<Vec<String>> {
    let source = db::open_source(sqlite_path)
        .await
        .with_context(|| format!("Failed to open source database: {}", sqlite_path.display()))?;
    let destination = db::connect_destination(destination_dsn)
        .await
        .context("Failed to connect to destination database")?;

    let limit = limit.filter(|n| *n > 0);
    let mut tx = destination.begin().await?;
    let mut imported = Vec::new();

    for table in TABLES {
        let columns = table_columns(&source, table).await?;
        if columns.is_empty() {
            // Table not present in this source database
            continue;
        }
        copy_table(&source, &mut tx, table, &columns, limit).await?;
        imported.push(table.to_string());
    }

    tx.commit().await?;
    destination.close().await;
    source.close().await;

    Ok(imported)
}

/// Column names for `table` in source-reported order; empty if the table
/// does not exist.
async fn table_columns(source: &SqlitePool, table: &str) -> Result<Vec<String>> {
    // Table names come from the fixed list above, never from caller input.
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(source)
        .await?;

    rows.iter()
        .map(|row| Ok(row.try_get::<String, _>("name")?))
        .collect()
}

async fn copy_table(
    source: &SqlitePool,
    tx: &mut sqlx::Transaction<'_, sqlx::Any>,
    table: &str,
    columns: &[String],
    limit: Option<i64>,
) -> Result<()> {
    let col_list = columns.join(", ");
    let placeholders = (1..=columns.len())
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ");
    // $n placeholders are valid in both Postgres and SQLite.
    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        table, col_list, placeholders
    );

    let mut offset: i64 = 0;
    loop {
        let batch = match limit {
            Some(limit) => (limit - offset).min(BATCH_SIZE),
            None => BATCH_SIZE,
        };
        if batch <= 0 {
            break;
        }

        let select = format!(
            "SELECT {} FROM {} LIMIT {} OFFSET {}",
            col_list, table, batch, offset
        );
        let rows = sqlx::query(&select).fetch_all(source).await?;

        for row in &rows {
            let mut query = sqlx::query(&insert);
            for idx in 0..columns.len() {
                query = match decode_value(row, idx)? {
                    SqlValue::Null => query.bind(Option::<String>::None),
                    SqlValue::Integer(v) => query.bind(v),
                    SqlValue::Real(v) => query.bind(v),
                    SqlValue::Text(v) => query.bind(v),
                    SqlValue::Blob(v) => query.bind(v),
                };
            }
            query.execute(&mut **tx).await?;
        }

        let fetched = rows.len() as i64;
        offset += fetched;
        if fetched < batch {
            break;
        }
    }

    Ok(())
}

/// Reads one column of a source row by its runtime storage class.
fn decode_value(row: &SqliteRow, idx: usize) -> Result<SqlValue> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get(idx)?),
        "REAL" | "NUMERIC" => SqlValue::Real(row.try_get(idx)?),
        "BLOB" => SqlValue::Blob(row.try_get(idx)?),
        _ => SqlValue::Text(row.try_get(idx)?),
    };

    Ok(value)
}
