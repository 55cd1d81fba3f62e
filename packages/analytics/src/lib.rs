#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate views over theft records.
//!
//! Each public function takes a [`TheftStore`](theft_map_database::TheftStore)
//! and the [`Predicate`](theft_map_database_models::Predicate) compiled from
//! the caller's filters, runs one grouping against the store, and reshapes
//! the result into the types in [`theft_map_analytics_models`].

pub mod dates;
pub mod points;
pub mod report;
pub mod views;

use theft_map_database::DbError;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The query matched nothing.
    #[error("{message}")]
    NoData {
        /// Description of what was missing.
        message: String,
    },

    /// Caller-supplied parameters could not be used.
    #[error("{message}")]
    InvalidRange {
        /// Description of the bad parameter.
        message: String,
    },

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

/// Collapses missing and non-finite values to `0.0`.
#[must_use]
pub fn safe_number(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Converts a count for a floating-point JSON cell.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn count_cell(count: u64) -> f64 {
    safe_number(Some(count as f64))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};
    use theft_map_database::memory::MemoryStore;
    use theft_map_database::pool::{DuckDbPool, DuckDbStore};
    use theft_map_database::theft_db;
    use theft_map_database_models::TheftDocument;

    pub fn documents(values: Vec<Value>) -> Vec<TheftDocument> {
        values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(TheftDocument::new(map)),
                _ => None,
            })
            .collect()
    }

    pub fn store(values: Vec<Value>) -> MemoryStore {
        MemoryStore::new(documents(values))
    }

    /// The same records as [`kolhapur`], inserted into an in-memory `DuckDB`.
    pub fn kolhapur_duckdb() -> DuckDbStore {
        let conn = theft_db::open_in_memory().unwrap();
        theft_db::insert_documents(&conn, &documents(kolhapur_values())).unwrap();
        DuckDbStore::new(DuckDbPool::new(conn, 1).unwrap())
    }

    /// A small dataset mixing both make and time-of-day spellings.
    pub fn kolhapur() -> MemoryStore {
        store(kolhapur_values())
    }

    fn kolhapur_values() -> Vec<Value> {
        vec![
            json!({ "POLICE_STATION": "Karveer", "MAKE": "Honda", "Time_of_day": "Morning", "DAY": "Monday", "DATE": "1.7.25", "LATITUDE": 16.70, "LONGITUDE": 74.24 }),
            json!({ "POLICE_STATION": "Karveer", "Make": "Honda", "Time_of_Day": "Morning", "DAY": "Monday", "DATE": "1.7.25", "LATITUDE": "16.71", "LONGITUDE": "74.25" }),
            json!({ "POLICE_STATION": "Karveer", "MAKE": "Hero", "Time_of_day": "Evening", "DAY": "Tuesday", "DATE": "2.7.25" }),
            json!({ "POLICE_STATION": "Shahupuri", "MAKE": "Honda", "Time_of_day": "Evening", "DAY": "Friday", "DATE": "2025-07-05" }),
            json!({ "POLICE_STATION": "Shahupuri", "MAKE": "Bajaj", "Time_of_day": "Night shift", "DAY": "Friday", "DATE": "5/7/2025" }),
            json!({ "MAKE": "TVS", "Time_of_day": "Midnight", "DAY": "Sunday", "DATE": "7.7.25", "LATITUDE": "91", "LONGITUDE": "10" }),
            json!({ "POLICE_STATION": "Rajarampuri", "MAKE": "Honda", "DAY": "Sunday", "DATE": "not a date", "LATITUDE": "abc", "LONGITUDE": "10" }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_number_collapses_non_finite() {
        assert!(safe_number(None).abs() < f64::EPSILON);
        assert!(safe_number(Some(f64::NAN)).abs() < f64::EPSILON);
        assert!(safe_number(Some(f64::INFINITY)).abs() < f64::EPSILON);
        assert!(safe_number(Some(f64::NEG_INFINITY)).abs() < f64::EPSILON);
    }

    #[test]
    fn safe_number_keeps_finite_values() {
        assert!((safe_number(Some(3.5)) - 3.5).abs() < f64::EPSILON);
        assert!((safe_number(Some(-2.0)) + 2.0).abs() < f64::EPSILON);
        assert!((count_cell(7) - 7.0).abs() < f64::EPSILON);
    }
}
