//! Geographic point extraction for the heat map.

use serde_json::Value;
use theft_map_analytics_models::{HeatPoint, HeatmapData};
use theft_map_database::TheftStore;
use theft_map_database_models::{Predicate, TheftDocument};
use theft_map_theft_models::TheftField;

use crate::AnalyticsError;

/// Map center used when no record has a usable location (Kolhapur).
pub const FALLBACK_CENTER: HeatPoint = HeatPoint {
    lat: 16.704,
    lon: 74.243,
};

fn coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Reads a record's location, if both coordinates are finite and in range.
#[must_use]
pub fn point_of(doc: &TheftDocument) -> Option<HeatPoint> {
    let lat = coordinate(doc.raw(TheftField::Latitude))?;
    let lon = coordinate(doc.raw(TheftField::Longitude))?;

    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
        .then_some(HeatPoint { lat, lon })
}

/// Returns the centroid of `points`, or [`FALLBACK_CENTER`] when empty.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn center_of(points: &[HeatPoint]) -> HeatPoint {
    if points.is_empty() {
        return FALLBACK_CENTER;
    }
    let n = points.len() as f64;
    HeatPoint {
        lat: points.iter().map(|p| p.lat).sum::<f64>() / n,
        lon: points.iter().map(|p| p.lon).sum::<f64>() / n,
    }
}

/// Collects the locations of matching records for the heat map.
///
/// Records with missing, malformed or out-of-range coordinates are skipped.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub fn heatmap_points(
    store: &dyn TheftStore,
    predicate: &Predicate,
) -> Result<HeatmapData, AnalyticsError> {
    let docs = store.find(predicate, &[TheftField::Latitude, TheftField::Longitude])?;
    let points: Vec<HeatPoint> = docs.iter().filter_map(point_of).collect();

    log::debug!(
        "Heat map: {} of {} records have usable coordinates",
        points.len(),
        docs.len()
    );

    Ok(HeatmapData {
        center: center_of(&points),
        points,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fixtures;

    #[test]
    fn keeps_only_valid_points() {
        let store = fixtures::store(vec![
            json!({ "LATITUDE": "91", "LONGITUDE": "10" }),
            json!({ "LATITUDE": "abc", "LONGITUDE": "10" }),
            json!({ "LATITUDE": "12.5", "LONGITUDE": "77.5" }),
        ]);
        let data = heatmap_points(&store, &Predicate::default()).unwrap();
        assert_eq!(data.points, vec![HeatPoint { lat: 12.5, lon: 77.5 }]);
        assert_eq!(data.center, HeatPoint { lat: 12.5, lon: 77.5 });
    }

    #[test]
    fn accepts_numeric_coordinates() {
        let store = fixtures::kolhapur();
        let data = heatmap_points(&store, &Predicate::default()).unwrap();
        assert_eq!(data.points.len(), 2);
    }

    #[test]
    fn rejects_missing_and_out_of_range_longitude() {
        let missing = TheftDocument::new(
            json!({ "LATITUDE": 10.0 }).as_object().cloned().unwrap(),
        );
        let far = TheftDocument::new(
            json!({ "LATITUDE": 10.0, "LONGITUDE": -180.5 })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(point_of(&missing), None);
        assert_eq!(point_of(&far), None);
    }

    #[test]
    fn empty_set_uses_fallback_center() {
        let store = fixtures::store(vec![]);
        let data = heatmap_points(&store, &Predicate::default()).unwrap();
        assert!(data.points.is_empty());
        assert_eq!(data.center, FALLBACK_CENTER);
    }
}
