//! Store selection from the environment.
//!
//! | Variable              | Meaning                                       |
//! |-----------------------|-----------------------------------------------|
//! | `THEFT_MAP_CSV`       | Serve records from this CSV file in memory    |
//! | `THEFT_MAP_DB`        | `DuckDB` file (default `data/thefts.duckdb`)  |
//! | `THEFT_MAP_POOL_SIZE` | Number of pooled connections (default 4)      |

use std::path::PathBuf;
use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::pool::{DuckDbPool, DuckDbStore};
use crate::{DbError, TheftStore, paths, theft_db};

/// Default number of pooled `DuckDB` connections.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Where the server reads theft records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// A CSV file loaded into memory.
    Csv(PathBuf),
    /// A `DuckDB` file opened read-only with a connection pool.
    DuckDb {
        /// Database file.
        path: PathBuf,
        /// Number of pooled connections.
        pool_size: usize,
    },
}

impl StoreConfig {
    /// Reads the store configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(csv) = non_empty("THEFT_MAP_CSV") {
            return Self::Csv(PathBuf::from(csv));
        }

        let path = non_empty("THEFT_MAP_DB").map_or_else(paths::default_db_path, PathBuf::from);
        let pool_size = non_empty("THEFT_MAP_POOL_SIZE")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        Self::DuckDb { path, pool_size }
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the CSV cannot be read or the database cannot
    /// be opened.
    pub fn connect(&self) -> Result<Arc<dyn TheftStore>, DbError> {
        match self {
            Self::Csv(path) => Ok(Arc::new(MemoryStore::from_csv_path(path)?)),
            Self::DuckDb { path, pool_size } => {
                log::info!(
                    "Opening theft database {} ({pool_size} connections)",
                    path.display()
                );
                let conn = theft_db::open_read_only(path)?;
                let pool = DuckDbPool::new(conn, *pool_size)?;
                Ok(Arc::new(DuckDbStore::new(pool)))
            }
        }
    }
}

/// Opens the theft store described by the environment.
///
/// # Errors
///
/// Returns [`DbError`] if the store cannot be opened.
pub fn connect_from_env() -> Result<Arc<dyn TheftStore>, DbError> {
    StoreConfig::from_env().connect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_duckdb() {
        assert_eq!(
            StoreConfig::from_vars(lookup(&[])),
            StoreConfig::DuckDb {
                path: paths::default_db_path(),
                pool_size: DEFAULT_POOL_SIZE,
            }
        );
    }

    #[test]
    fn csv_takes_precedence() {
        let config = StoreConfig::from_vars(lookup(&[
            ("THEFT_MAP_CSV", "thefts.csv"),
            ("THEFT_MAP_DB", "other.duckdb"),
        ]));
        assert_eq!(config, StoreConfig::Csv(PathBuf::from("thefts.csv")));
    }

    #[test]
    fn bad_pool_size_falls_back() {
        let config = StoreConfig::from_vars(lookup(&[
            ("THEFT_MAP_DB", "x.duckdb"),
            ("THEFT_MAP_POOL_SIZE", "many"),
        ]));
        assert_eq!(
            config,
            StoreConfig::DuckDb {
                path: PathBuf::from("x.duckdb"),
                pool_size: DEFAULT_POOL_SIZE,
            }
        );
    }

    #[test]
    fn connects_to_empty_csv_backed_store() {
        let dir = std::env::temp_dir().join(format!("theft_map_db_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.csv");
        std::fs::write(&path, "POLICE_STATION,MAKE\n").unwrap();

        let store = StoreConfig::Csv(path).connect().unwrap();
        assert_eq!(store.count(&theft_map_database_models::Predicate::default()).unwrap(), 0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
