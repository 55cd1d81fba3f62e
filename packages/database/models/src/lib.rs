#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Theft document, filter predicate, and grouping query types.
//!
//! These types describe what a caller asks of the record store: which
//! records participate ([`Predicate`]), how to group them ([`GroupQuery`]),
//! and the shapes handed back ([`TheftDocument`], [`GroupCount`]). They are
//! independent of any particular store binding.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use theft_map_theft_models::TheftField;

/// Caller-supplied constraints narrowing which records participate in an
/// aggregation. Every field is optional; empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheftFilter {
    /// Allowed police stations.
    pub localities: Vec<String>,
    /// Allowed places.
    pub places: Vec<String>,
    /// Exact vehicle make.
    pub company: Option<String>,
    /// Allowed vehicle categories.
    pub categories: Vec<String>,
    /// Exact time-of-day bucket (`"All"` means any).
    pub time_of_day: Option<String>,
    /// Allowed days.
    pub days: Vec<String>,
    /// Allowed location-type tags.
    pub spot_types: Vec<String>,
}

/// How a single clause compares a record's field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Value must equal this string exactly.
    Equals(String),
    /// Value must be one of these strings.
    OneOf(Vec<String>),
}

impl Matcher {
    /// Returns whether a field value satisfies this matcher. Missing values
    /// never match.
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Self::Equals(expected) => expected == value,
            Self::OneOf(allowed) => allowed.iter().any(|a| a == value),
        }
    }
}

/// A single field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Field being constrained.
    pub field: TheftField,
    /// Comparison applied to the field value.
    pub matcher: Matcher,
}

/// A conjunction of [`Clause`]s. The empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Creates a predicate from an ordered list of clauses.
    #[must_use]
    pub const fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Returns the clauses of this predicate.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns `true` if this predicate imposes no constraint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the clause constraining `field`, if any.
    #[must_use]
    pub fn clause_for(&self, field: TheftField) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.field == field)
    }

    /// Evaluates this predicate against a document.
    #[must_use]
    pub fn matches(&self, doc: &TheftDocument) -> bool {
        self.clauses
            .iter()
            .all(|c| c.matcher.matches(doc.field(c.field).as_deref()))
    }
}

/// A theft record as stored: an arbitrary JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheftDocument(Map<String, Value>);

impl TheftDocument {
    /// Wraps a JSON object.
    #[must_use]
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns a mutable reference to the underlying JSON object.
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Consumes the document and returns the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Returns the raw JSON value of the first stored key for `field` that
    /// holds a non-null value.
    #[must_use]
    pub fn raw(&self, field: TheftField) -> Option<&Value> {
        field
            .stored_keys()
            .iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| !v.is_null())
    }

    /// Returns the text of `field`, probing every stored spelling. Numbers
    /// and booleans are rendered as their JSON text.
    #[must_use]
    pub fn field(&self, field: TheftField) -> Option<String> {
        self.raw(field).map(value_text)
    }

    /// Returns a copy holding only the stored keys of `fields` that are
    /// present in this document.
    #[must_use]
    pub fn project(&self, fields: &[TheftField]) -> Self {
        let mut out = Map::new();
        for field in fields {
            for key in field.stored_keys() {
                if let Some(v) = self.0.get(*key) {
                    out.insert((*key).to_string(), v.clone());
                }
            }
        }
        Self(out)
    }
}

impl From<Map<String, Value>> for TheftDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // DuckDB writes large exponents as `1e21`, serde_json as `1e+21`.
        Value::Number(n) if n.is_f64() => n.to_string().replace("e+", "e"),
        other => other.to_string(),
    }
}

/// One grouping key of a [`GroupQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupKey {
    /// Field whose value forms the key.
    pub field: TheftField,
    /// Literal substituted when the field is missing. `None` keeps the key
    /// missing.
    pub if_missing: Option<String>,
}

/// Ordering of grouped results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Largest count first; ties by key ascending, missing keys last.
    #[default]
    CountDesc,
    /// Key ascending with missing keys first; ties by count descending.
    KeyAsc,
}

impl GroupOrder {
    /// Compares two groups under this ordering.
    #[must_use]
    pub fn compare(self, a: &GroupCount, b: &GroupCount) -> Ordering {
        match self {
            Self::CountDesc => b
                .count
                .cmp(&a.count)
                .then_with(|| compare_keys_missing_last(&a.keys, &b.keys)),
            Self::KeyAsc => a.keys.cmp(&b.keys).then_with(|| b.count.cmp(&a.count)),
        }
    }
}

fn compare_keys_missing_last(a: &[Option<String>], b: &[Option<String>]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// A group-by request: keys, ordering, and an optional result limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupQuery {
    /// Grouping keys, in output order.
    pub keys: Vec<GroupKey>,
    /// Result ordering.
    pub order: GroupOrder,
    /// Maximum number of groups to return.
    pub limit: Option<usize>,
}

impl GroupQuery {
    /// Groups by a single field, ordered by descending count.
    #[must_use]
    pub fn by(field: TheftField) -> Self {
        Self::by_all(&[field])
    }

    /// Groups by the tuple of `fields`, ordered by descending count.
    #[must_use]
    pub fn by_all(fields: &[TheftField]) -> Self {
        Self {
            keys: fields
                .iter()
                .map(|&field| GroupKey {
                    field,
                    if_missing: None,
                })
                .collect(),
            order: GroupOrder::CountDesc,
            limit: None,
        }
    }

    /// Substitutes `literal` for missing values of every key.
    #[must_use]
    pub fn if_missing(mut self, literal: &str) -> Self {
        for key in &mut self.keys {
            key.if_missing = Some(literal.to_string());
        }
        self
    }

    /// Sets the result ordering.
    #[must_use]
    pub const fn order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    /// Limits the number of groups returned.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Number of records sharing one combination of key values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    /// Key values, one per [`GroupQuery::keys`] entry.
    pub keys: Vec<Option<String>>,
    /// Number of records in the group.
    pub count: u64,
}

impl GroupCount {
    /// Returns the key value at `index`, if present.
    #[must_use]
    pub fn key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).and_then(Option::as_deref)
    }
}
