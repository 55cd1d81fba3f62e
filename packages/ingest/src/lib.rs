#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for loading theft records into the `DuckDB` theft database and
//! maintaining them.

pub mod interactive;

use std::path::{Path, PathBuf};

use duckdb::Connection;
use theft_map_database::{DbError, paths, theft_db};

/// Returns the database path from `THEFT_MAP_DB`, or the default under
/// `data/`.
#[must_use]
pub fn database_path() -> PathBuf {
    std::env::var("THEFT_MAP_DB")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(paths::default_db_path, PathBuf::from)
}

/// Returns `explicit` if given, otherwise [`database_path`].
#[must_use]
pub fn resolve_database_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(database_path)
}

/// Opens the theft database for writing, creating it if needed.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened.
pub fn open_database(path: &Path) -> Result<Connection, DbError> {
    log::info!("Opening theft database {}", path.display());
    theft_db::open(path)
}

/// Summary of the stored records and the last import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored records.
    pub record_count: u64,
    /// File the last import read from.
    pub source_file: Option<String>,
    /// When the last import finished (RFC 3339).
    pub last_imported_at: Option<String>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Records:       {}", self.record_count)?;
        writeln!(
            f,
            "Source file:   {}",
            self.source_file.as_deref().unwrap_or("-")
        )?;
        write!(
            f,
            "Last imported: {}",
            self.last_imported_at.as_deref().unwrap_or("never")
        )
    }
}

/// Reads the record count and import metadata.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be queried.
pub fn stats(conn: &Connection) -> Result<StoreStats, DbError> {
    Ok(StoreStats {
        record_count: theft_db::get_record_count(conn)?,
        source_file: theft_db::get_meta(conn, "source_file")?,
        last_imported_at: theft_db::get_meta(conn, "last_imported_at")?,
    })
}
