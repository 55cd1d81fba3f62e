#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Theft record store access for the theft map.
//!
//! Records live as JSON documents in a `DuckDB` table. Callers describe the
//! records they want with a [`Predicate`] compiled by [`filter::compile`] and
//! read them through the [`TheftStore`] trait, which both the `DuckDB`
//! binding ([`pool::DuckDbStore`]) and the in-memory store
//! ([`memory::MemoryStore`]) implement with identical semantics.

pub mod cleanup;
pub mod db;
pub mod filter;
pub mod import;
pub mod memory;
pub mod paths;
pub mod pool;
pub mod queries;
pub mod theft_db;

use theft_map_database_models::{GroupCount, GroupQuery, Predicate, TheftDocument};
use theft_map_theft_models::TheftField;

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Stored document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Read access to the collection of theft records.
///
/// Implementations must agree on field probing (every stored spelling of a
/// field), clause semantics (missing values never match), and group
/// ordering ([`theft_map_database_models::GroupOrder`]).
pub trait TheftStore: Send + Sync {
    /// Counts records matching `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    fn count(&self, predicate: &Predicate) -> Result<u64, DbError>;

    /// Groups records matching `predicate` and counts each group.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    fn group_count(
        &self,
        predicate: &Predicate,
        query: &GroupQuery,
    ) -> Result<Vec<GroupCount>, DbError>;

    /// Returns records matching `predicate`, projected to every stored
    /// spelling of `projection`. An empty projection returns whole
    /// documents.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or a stored document
    /// is malformed.
    fn find(
        &self,
        predicate: &Predicate,
        projection: &[TheftField],
    ) -> Result<Vec<TheftDocument>, DbError>;
}

/// Applies a projection, treating an empty field list as "everything".
pub(crate) fn apply_projection(doc: TheftDocument, projection: &[TheftField]) -> TheftDocument {
    if projection.is_empty() {
        doc
    } else {
        doc.project(projection)
    }
}
