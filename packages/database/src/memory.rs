//! In-memory theft record store.
//!
//! Evaluates predicates and groupings in Rust over a vector of documents.
//! Used to serve a CSV file directly without a database, and as the fixture
//! store in tests.

use std::collections::BTreeMap;
use std::path::Path;

use theft_map_database_models::{GroupCount, GroupQuery, Predicate, TheftDocument};
use theft_map_theft_models::TheftField;

use crate::{DbError, TheftStore, apply_projection, import};

/// A [`TheftStore`] backed by a vector of documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<TheftDocument>,
}

impl MemoryStore {
    /// Creates a store holding `documents`.
    #[must_use]
    pub const fn new(documents: Vec<TheftDocument>) -> Self {
        Self { documents }
    }

    /// Loads every row of a CSV file as a document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be read or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, DbError> {
        let documents = import::read_csv_path(path)?;
        log::info!(
            "Loaded {} theft records from {} into memory",
            documents.len(),
            path.display()
        );
        Ok(Self::new(documents))
    }

    /// Returns the number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn matching<'a>(
        &'a self,
        predicate: &'a Predicate,
    ) -> impl Iterator<Item = &'a TheftDocument> + 'a {
        self.documents.iter().filter(|d| predicate.matches(d))
    }
}

impl TheftStore for MemoryStore {
    fn count(&self, predicate: &Predicate) -> Result<u64, DbError> {
        Ok(u64::try_from(self.matching(predicate).count()).unwrap_or(0))
    }

    fn group_count(
        &self,
        predicate: &Predicate,
        query: &GroupQuery,
    ) -> Result<Vec<GroupCount>, DbError> {
        let mut counts: BTreeMap<Vec<Option<String>>, u64> = BTreeMap::new();

        for doc in self.matching(predicate) {
            let keys = query
                .keys
                .iter()
                .map(|k| doc.field(k.field).or_else(|| k.if_missing.clone()))
                .collect();
            *counts.entry(keys).or_insert(0) += 1;
        }

        let mut groups: Vec<GroupCount> = counts
            .into_iter()
            .map(|(keys, count)| GroupCount { keys, count })
            .collect();
        groups.sort_by(|a, b| query.order.compare(a, b));
        if let Some(limit) = query.limit {
            groups.truncate(limit);
        }

        Ok(groups)
    }

    fn find(
        &self,
        predicate: &Predicate,
        projection: &[TheftField],
    ) -> Result<Vec<TheftDocument>, DbError> {
        Ok(self
            .matching(predicate)
            .map(|d| apply_projection(d.clone(), projection))
            .collect())
    }
}
