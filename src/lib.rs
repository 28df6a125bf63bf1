//! # DeskOps
//!
//! Operations toolkit for the gulfchain trading-desk monorepo.
//!
//! DeskOps does two unrelated but equally boring jobs:
//!
//! 1. **Docs indexing** — crawl the fixed documentation directories under
//!    the gulfchain root, extract a title and summary from each file, and
//!    maintain a single `docs_index.json` artifact. Manually curated fields
//!    (tags, meta, status, visibility, owner) survive rebuilds.
//! 2. **Backtest import** — copy a fixed list of tables from a read-only
//!    SQLite backtest database into the destination relational store,
//!    skipping tables absent in the source and silently dropping rows that
//!    collide with an existing destination key.
//!
//! Both jobs are exposed through the `deskops` CLI; the importer is also
//! reachable over HTTP via `POST /v1/import/backtests`.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Docs index JSON shapes |
//! | [`index`] | Docs index builder |
//! | [`import`] | SQLite → destination table importer |
//! | [`db`] | Database connection helpers |
//! | [`server`] | HTTP service |

pub mod config;
pub mod db;
pub mod import;
pub mod index;
pub mod models;
pub mod server;
