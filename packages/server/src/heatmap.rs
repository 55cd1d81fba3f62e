//! Heat map document rendering.
//!
//! Produces a standalone HTML page that draws the points with Leaflet and
//! the `leaflet.heat` plugin over OpenStreetMap tiles.

use theft_map_analytics_models::HeatmapData;

/// Initial zoom level of the rendered map.
pub const DEFAULT_ZOOM: u8 = 13;

const LEAFLET_VERSION: &str = "1.9.4";
const LEAFLET_HEAT_VERSION: &str = "0.2.0";

/// Renders the heat map page for `data`.
#[must_use]
pub fn render(data: &HeatmapData) -> String {
    let points: Vec<[f64; 2]> = data.points.iter().map(|p| [p.lat, p.lon]).collect();
    // A `[f64; 2]` list only ever serializes to digits, brackets and commas.
    let points_json = serde_json::to_string(&points).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>Theft heat map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css" />
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.heat@{LEAFLET_HEAT_VERSION}/dist/leaflet-heat.js"></script>
<style>html, body, #map {{ width: 100%; height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
  var map = L.map("map").setView([{lat}, {lon}], {DEFAULT_ZOOM});
  L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
    maxZoom: 19,
    attribution: "&copy; OpenStreetMap contributors"
  }}).addTo(map);
  L.heatLayer({points_json}).addTo(map);
</script>
</body>
</html>
"#,
        lat = data.center.lat,
        lon = data.center.lon,
    )
}
