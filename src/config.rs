use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration, constructed once in `main` and passed by
/// reference into whichever function needs it.
///
/// Every field has a default, so a missing config file is not an error:
/// the service can run entirely on built-ins. `GULFCHAIN_ROOT` overrides
/// `index.root` at load time.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub backtests: BacktestsConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            bind: default_bind(),
        }
    }
}

fn default_service_name() -> String {
    "deskops".to_string()
}
fn default_bind() -> String {
    "127.0.0.1:8090".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Destination DSN for the backtest importer.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "postgres://postgres@127.0.0.1:5432/deskops".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BacktestsConfig {
    /// Default source database when the CLI or HTTP caller does not name one.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

impl Default for BacktestsConfig {
    fn default() -> Self {
        Self {
            sqlite_path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("/data/backtests.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Gulfchain monorepo root. The documentation source directories and
    /// the index output path are resolved against this.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Index output path, relative to `root`.
    #[serde(default = "default_index_output")]
    pub output: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            output: default_index_output(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_index_output() -> PathBuf {
    PathBuf::from("DeskOps/apps/metadata_indices/docs_index.json")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    if let Ok(root) = std::env::var("GULFCHAIN_ROOT") {
        if !root.is_empty() {
            config.index.root = PathBuf::from(root);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/deskops.toml")).unwrap();
        assert_eq!(config.service.name, "deskops");
        assert_eq!(config.backtests.sqlite_path, default_sqlite_path());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[service]\nname = \"custom\"\n").unwrap();
        assert_eq!(config.service.name, "custom");
        assert_eq!(config.service.bind, "127.0.0.1:8090");
        assert_eq!(config.database.url, default_database_url());
    }
}
