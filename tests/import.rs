//! Importer behavior against real SQLite files on both ends.
//!
//! The destination is a SQLite file addressed through the same DSN-driven
//! code path production uses for Postgres.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;

use deskops::import::import_sqlite_to_postgres;

async fn open_rw(path: &Path) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap()
}

async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

struct Fixture {
    _tmp: TempDir,
    source_path: PathBuf,
    dest_path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let source_path = tmp.path().join("backtests.sqlite");
        let dest_path = tmp.path().join("dest.sqlite");
        Self {
            _tmp: tmp,
            source_path,
            dest_path,
        }
    }

    fn dest_dsn(&self) -> String {
        format!("sqlite:{}", self.dest_path.display())
    }
}

#[tokio::test]
async fn test_import_skips_absent_tables() {
    let fx = Fixture::new();

    let source = open_rw(&fx.source_path).await;
    exec(&source, "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(&source, "INSERT INTO runs VALUES (1, 'baseline')").await;
    exec(&source, "CREATE TABLE signals (id INTEGER PRIMARY KEY, score REAL)").await;
    exec(&source, "INSERT INTO signals VALUES (1, 0.5)").await;
    source.close().await;

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(&dest, "CREATE TABLE signals (id INTEGER PRIMARY KEY, score REAL)").await;
    dest.close().await;

    let imported = import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), None)
        .await
        .unwrap();
    assert_eq!(imported, vec!["runs".to_string(), "signals".to_string()]);
}

#[tokio::test]
async fn test_limit_caps_rows_per_table() {
    let fx = Fixture::new();

    let source = open_rw(&fx.source_path).await;
    exec(&source, "CREATE TABLE trades (id INTEGER PRIMARY KEY, qty INTEGER)").await;
    for i in 0..50 {
        exec(&source, &format!("INSERT INTO trades VALUES ({}, {})", i, i * 10)).await;
    }
    source.close().await;

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE trades (id INTEGER PRIMARY KEY, qty INTEGER)").await;
    dest.close().await;

    let imported = import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), Some(10))
        .await
        .unwrap();
    assert_eq!(imported, vec!["trades".to_string()]);

    let dest = open_rw(&fx.dest_path).await;
    assert_eq!(count(&dest, "trades").await, 10);
    dest.close().await;
}

#[tokio::test]
async fn test_nonpositive_limit_means_unbounded() {
    let fx = Fixture::new();

    let source = open_rw(&fx.source_path).await;
    exec(&source, "CREATE TABLE trades (id INTEGER PRIMARY KEY)").await;
    for i in 0..25 {
        exec(&source, &format!("INSERT INTO trades VALUES ({})", i)).await;
    }
    source.close().await;

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE trades (id INTEGER PRIMARY KEY)").await;
    dest.close().await;

    import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), Some(0))
        .await
        .unwrap();

    let dest = open_rw(&fx.dest_path).await;
    assert_eq!(count(&dest, "trades").await, 25);
    dest.close().await;
}

#[tokio::test]
async fn test_conflicting_rows_dropped_silently() {
    let fx = Fixture::new();

    let source = open_rw(&fx.source_path).await;
    exec(&source, "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(&source, "INSERT INTO runs VALUES (1, 'incoming')").await;
    exec(&source, "INSERT INTO runs VALUES (2, 'fresh')").await;
    source.close().await;

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(&dest, "INSERT INTO runs VALUES (1, 'keep')").await;
    dest.close().await;

    let imported = import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), None)
        .await
        .unwrap();
    assert_eq!(imported, vec!["runs".to_string()]);

    let dest = open_rw(&fx.dest_path).await;
    assert_eq!(count(&dest, "runs").await, 2);
    let name: String = sqlx::query_scalar("SELECT name FROM runs WHERE id = 1")
        .fetch_one(&dest)
        .await
        .unwrap();
    // Existing row wins; the conflicting source row is dropped
    assert_eq!(name, "keep");
    dest.close().await;
}

#[tokio::test]
async fn test_end_to_end_copies_row_values() {
    let fx = Fixture::new();

    let source = open_rw(&fx.source_path).await;
    exec(
        &source,
        "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT, sharpe REAL, notes TEXT)",
    )
    .await;
    exec(&source, "INSERT INTO runs VALUES (7, 'baseline', 1.25, NULL)").await;
    exec(&source, "CREATE TABLE signals (id INTEGER PRIMARY KEY, score REAL)").await;
    exec(&source, "INSERT INTO signals VALUES (1, 0.75)").await;
    source.close().await;

    let dest = open_rw(&fx.dest_path).await;
    exec(
        &dest,
        "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT, sharpe REAL, notes TEXT)",
    )
    .await;
    exec(&dest, "CREATE TABLE signals (id INTEGER PRIMARY KEY, score REAL)").await;
    dest.close().await;

    let imported = import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), None)
        .await
        .unwrap();
    assert_eq!(imported, vec!["runs".to_string(), "signals".to_string()]);

    let dest = open_rw(&fx.dest_path).await;
    assert_eq!(count(&dest, "runs").await, 1);
    assert_eq!(count(&dest, "signals").await, 1);

    let row = sqlx::query("SELECT id, name, sharpe, notes FROM runs")
        .fetch_one(&dest)
        .await
        .unwrap();
    assert_eq!(row.get::<i64, _>("id"), 7);
    assert_eq!(row.get::<String, _>("name"), "baseline");
    assert_eq!(row.get::<f64, _>("sharpe"), 1.25);
    assert_eq!(row.get::<Option<String>, _>("notes"), None);
    dest.close().await;
}

#[tokio::test]
async fn test_failure_leaves_destination_uncommitted() {
    let fx = Fixture::new();

    // Source has runs and signals; destination only has runs, so the
    // signals insert fails after runs was already copied.
    let source = open_rw(&fx.source_path).await;
    exec(&source, "CREATE TABLE runs (id INTEGER PRIMARY KEY)").await;
    exec(&source, "INSERT INTO runs VALUES (1)").await;
    exec(&source, "CREATE TABLE signals (id INTEGER PRIMARY KEY)").await;
    exec(&source, "INSERT INTO signals VALUES (1)").await;
    source.close().await;

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE runs (id INTEGER PRIMARY KEY)").await;
    dest.close().await;

    let result = import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), None).await;
    assert!(result.is_err());

    // The single end-of-run commit never happened
    let dest = open_rw(&fx.dest_path).await;
    assert_eq!(count(&dest, "runs").await, 0);
    dest.close().await;
}

#[tokio::test]
async fn test_missing_source_is_an_error() {
    let fx = Fixture::new();

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE runs (id INTEGER PRIMARY KEY)").await;
    dest.close().await;

    let missing = fx._tmp.path().join("nope.sqlite");
    let result = import_sqlite_to_postgres(&missing, &fx.dest_dsn(), None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_source_left_untouched() {
    let fx = Fixture::new();

    let source = open_rw(&fx.source_path).await;
    exec(&source, "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(&source, "INSERT INTO runs VALUES (1, 'baseline')").await;
    source.close().await;
    let before = std::fs::read(&fx.source_path).unwrap();

    let dest = open_rw(&fx.dest_path).await;
    exec(&dest, "CREATE TABLE runs (id INTEGER PRIMARY KEY, name TEXT)").await;
    dest.close().await;

    import_sqlite_to_postgres(&fx.source_path, &fx.dest_dsn(), None)
        .await
        .unwrap();

    let after = std::fs::read(&fx.source_path).unwrap();
    assert_eq!(before, after);
}
