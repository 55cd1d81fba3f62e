//! Coordinate cleanup for imported theft records.
//!
//! Spreadsheet exports carry coordinates like `"16.7041° N"` or `"74.24,"`.
//! This pass strips everything except digits, `.` and `-`, and rewrites
//! `LATITUDE` / `LONGITUDE` as JSON numbers when both values survive.

use duckdb::Connection;
use serde_json::{Number, Value};
use theft_map_database_models::TheftDocument;

use crate::{DbError, theft_db};

const LATITUDE_KEY: &str = "LATITUDE";
const LONGITUDE_KEY: &str = "LONGITUDE";

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Documents whose coordinates were rewritten.
    pub updated: u64,
    /// Documents left untouched because a coordinate could not be cleaned.
    pub skipped: u64,
}

/// Cleans a single coordinate value.
///
/// Returns `None` for null or when nothing numeric remains.
#[must_use]
pub fn clean_coord(value: &Value) -> Option<f64> {
    let text = match value {
        Value::Null => return None,
        Value::Number(n) => return n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Rewrites the coordinates of `doc` as numbers.
///
/// Returns `false` (leaving `doc` unchanged) unless both coordinates clean
/// successfully.
pub fn clean_document(doc: &mut TheftDocument) -> bool {
    let map = doc.as_map();
    let lat = map.get(LATITUDE_KEY).and_then(clean_coord);
    let lon = map.get(LONGITUDE_KEY).and_then(clean_coord);

    let (Some(lat), Some(lon)) = (lat.and_then(Number::from_f64), lon.and_then(Number::from_f64))
    else {
        return false;
    };

    let map = doc.as_map_mut();
    map.insert(LATITUDE_KEY.to_string(), Value::Number(lat));
    map.insert(LONGITUDE_KEY.to_string(), Value::Number(lon));
    true
}

/// Cleans the coordinates of every stored document in place.
///
/// # Errors
///
/// Returns [`DbError`] if documents cannot be read or written.
pub fn clean_coordinates(conn: &Connection) -> Result<CleanupSummary, DbError> {
    let mut summary = CleanupSummary::default();
    let mut updates = Vec::new();

    for (id, mut doc) in theft_db::load_documents(conn)? {
        if clean_document(&mut doc) {
            updates.push((id, doc));
        } else {
            log::warn!(
                "Skipping record {id}: could not convert {:?} / {:?}",
                doc.as_map().get(LATITUDE_KEY),
                doc.as_map().get(LONGITUDE_KEY),
            );
            summary.skipped += 1;
        }
    }

    summary.updated = theft_db::update_documents(conn, &updates)?;
    log::info!(
        "Cleaned coordinates: {} updated, {} skipped",
        summary.updated,
        summary.skipped
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_noise_characters() {
        assert_eq!(clean_coord(&json!("16.7041° N")), Some(16.7041));
        assert_eq!(clean_coord(&json!("-74.24,")), Some(-74.24));
        assert_eq!(clean_coord(&json!(74.5)), Some(74.5));
    }

    #[test]
    fn rejects_values_without_numbers() {
        assert_eq!(clean_coord(&json!("abc")), None);
        assert_eq!(clean_coord(&json!("")), None);
        assert_eq!(clean_coord(&Value::Null), None);
        assert_eq!(clean_coord(&json!("1.2.3")), None);
    }

    #[test]
    fn rewrites_both_coordinates_as_numbers() {
        let mut doc = TheftDocument::new(
            json!({ "LATITUDE": "16.70N", "LONGITUDE": "74.24E", "MAKE": "Honda" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(clean_document(&mut doc));
        assert_eq!(doc.as_map()["LATITUDE"], json!(16.70));
        assert_eq!(doc.as_map()["LONGITUDE"], json!(74.24));
        assert_eq!(doc.as_map()["MAKE"], json!("Honda"));
    }

    #[test]
    fn leaves_document_alone_when_one_side_fails() {
        let original = json!({ "LATITUDE": "16.70", "LONGITUDE": "east" })
            .as_object()
            .cloned()
            .unwrap();
        let mut doc = TheftDocument::new(original.clone());
        assert!(!clean_document(&mut doc));
        assert_eq!(doc.as_map(), &original);
    }

    #[test]
    fn cleans_stored_documents() {
        let conn = theft_db::open_in_memory().unwrap();
        let docs: Vec<TheftDocument> = [
            json!({ "LATITUDE": "16.70 N", "LONGITUDE": "74.24 E" }),
            json!({ "LATITUDE": "n/a", "LONGITUDE": "74.24" }),
        ]
        .iter()
        .filter_map(|v| v.as_object().cloned().map(TheftDocument::new))
        .collect();
        theft_db::insert_documents(&conn, &docs).unwrap();

        let summary = clean_coordinates(&conn).unwrap();
        assert_eq!(
            summary,
            CleanupSummary {
                updated: 1,
                skipped: 1
            }
        );
    }
}
