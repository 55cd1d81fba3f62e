//! Connection pool and [`TheftStore`] binding for `DuckDB`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use duckdb::Connection;
use theft_map_database_models::{GroupCount, GroupQuery, Predicate, TheftDocument};
use theft_map_theft_models::TheftField;

use crate::{DbError, TheftStore, queries};

/// Simple round-robin pool of `DuckDB` connections sharing one database.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so each connection is
/// wrapped in a `Mutex`. The pool hands out connections round-robin via
/// an atomic counter, allowing concurrent queries on different
/// connections.
pub struct DuckDbPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl DuckDbPool {
    /// Builds a pool of `size` connections by cloning `conn`. A size of
    /// zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a connection cannot be cloned.
    pub fn new(conn: Connection, size: usize) -> Result<Self, DbError> {
        let mut connections = Vec::with_capacity(size.max(1));
        for _ in 1..size.max(1) {
            connections.push(Mutex::new(conn.try_clone()?));
        }
        connections.push(Mutex::new(conn));

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Returns the number of pooled connections.
    #[must_use]
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Acquires the next connection from the pool (round-robin).
    ///
    /// A connection whose previous holder panicked is still handed out;
    /// queries leave no partial state on the connection.
    pub fn acquire(&self) -> MutexGuard<'_, Connection> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`TheftStore`] reading from a pooled `DuckDB` database.
pub struct DuckDbStore {
    pool: DuckDbPool,
}

impl DuckDbStore {
    /// Wraps a connection pool.
    #[must_use]
    pub const fn new(pool: DuckDbPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &DuckDbPool {
        &self.pool
    }
}

impl TheftStore for DuckDbStore {
    fn count(&self, predicate: &Predicate) -> Result<u64, DbError> {
        queries::count(&self.pool.acquire(), predicate)
    }

    fn group_count(
        &self,
        predicate: &Predicate,
        query: &GroupQuery,
    ) -> Result<Vec<GroupCount>, DbError> {
        queries::group_count(&self.pool.acquire(), predicate, query)
    }

    fn find(
        &self,
        predicate: &Predicate,
        projection: &[TheftField],
    ) -> Result<Vec<TheftDocument>, DbError> {
        queries::find(&self.pool.acquire(), predicate, projection)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use theft_map_database_models::{GroupOrder, TheftFilter};

    use super::*;
    use crate::filter::compile;
    use crate::memory::MemoryStore;
    use crate::theft_db;

    fn documents() -> Vec<TheftDocument> {
        [
            json!({ "POLICE_STATION": "Karveer", "MAKE": "Honda", "Time_of_day": "Morning", "LATITUDE": 16.7 }),
            json!({ "POLICE_STATION": "Karveer", "Make": "Honda", "Time_of_day": "Evening" }),
            json!({ "POLICE_STATION": "Shahupuri", "MAKE": "Hero", "Time_of_day": "Morning" }),
            json!({ "MAKE": "Honda", "Time_of_Day": "Morning" }),
            json!({ "POLICE_STATION": "Shahupuri", "MAKE": "Bajaj" }),
        ]
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Object(map) => Some(TheftDocument::new(map)),
            _ => None,
        })
        .collect()
    }

    fn duck_store() -> DuckDbStore {
        let conn = theft_db::open_in_memory().unwrap();
        theft_db::insert_documents(&conn, &documents()).unwrap();
        DuckDbStore::new(DuckDbPool::new(conn, 2).unwrap())
    }

    #[test]
    fn pool_never_empty() {
        let conn = theft_db::open_in_memory().unwrap();
        assert_eq!(DuckDbPool::new(conn, 0).unwrap().size(), 1);
    }

    #[test]
    fn cloned_connections_share_data() {
        let store = duck_store();
        for _ in 0..4 {
            assert_eq!(store.count(&Predicate::default()).unwrap(), 5);
        }
    }

    #[test]
    fn agrees_with_memory_store_on_counts() {
        let duck = duck_store();
        let memory = MemoryStore::new(documents());
        let filter = TheftFilter {
            company: Some("Honda".to_string()),
            time_of_day: Some("Morning".to_string()),
            ..TheftFilter::default()
        };
        let predicate = compile(&filter);
        assert_eq!(duck.count(&predicate).unwrap(), 2);
        assert_eq!(
            duck.count(&predicate).unwrap(),
            memory.count(&predicate).unwrap()
        );
    }

    #[test]
    fn agrees_with_memory_store_on_groups() {
        let duck = duck_store();
        let memory = MemoryStore::new(documents());
        let queries = [
            GroupQuery::by(TheftField::Station).if_missing("Unknown"),
            GroupQuery::by(TheftField::TimeOfDay),
            GroupQuery::by(TheftField::Make).limit(2),
            GroupQuery::by_all(&[TheftField::Make, TheftField::TimeOfDay])
                .order(GroupOrder::KeyAsc),
        ];
        for query in &queries {
            assert_eq!(
                duck.group_count(&Predicate::default(), query).unwrap(),
                memory.group_count(&Predicate::default(), query).unwrap(),
                "{query:?}"
            );
        }
    }

    #[test]
    fn agrees_with_memory_store_on_number_keys() {
        let documents: Vec<TheftDocument> = [
            json!({ "LATITUDE": 1e21 }),
            json!({ "LATITUDE": 16.7 }),
            json!({ "LATITUDE": 16 }),
            json!({ "LATITUDE": true }),
        ]
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Object(map) => Some(TheftDocument::new(map)),
            _ => None,
        })
        .collect();

        let conn = theft_db::open_in_memory().unwrap();
        theft_db::insert_documents(&conn, &documents).unwrap();
        let duck = DuckDbStore::new(DuckDbPool::new(conn, 1).unwrap());
        let memory = MemoryStore::new(documents);

        let query = GroupQuery::by(TheftField::Latitude).order(GroupOrder::KeyAsc);
        assert_eq!(
            duck.group_count(&Predicate::default(), &query).unwrap(),
            memory.group_count(&Predicate::default(), &query).unwrap()
        );
    }

    #[test]
    fn find_projects_and_keeps_numbers() {
        let docs = duck_store()
            .find(&Predicate::default(), &[TheftField::Latitude])
            .unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0].as_map()["LATITUDE"], json!(16.7));
        assert!(docs[1].as_map().is_empty());
    }
}
