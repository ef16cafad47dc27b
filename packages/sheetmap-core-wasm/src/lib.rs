use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

// Create a console module for logging
pub mod console;
// Import our error taxonomy
pub mod errors;
// Import our user-action dispatch
pub mod events;
// Import our proximity filter
pub mod filter;
// Import our geometry normalization module
pub mod geometry;
// Import our row ingest module
pub mod ingest;
// Import our models
mod models;
// Import our registry and filter state
pub mod registry;
// Import our spatial helpers
mod spatial;

use events::UserAction;
use models::{FeatureProperties, LoadSummary, ShapeStyle};
use registry::MapState;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macros from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_error {
    ($($t:tt)*) => (crate::console::error(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("sheetmap core initialized");
    });
}

// Register the ingested features in the registry: Point features become
// markers, everything else a shape judged by its bounding-box center.
fn register_features(state: &mut MapState, features: &[geometry::Feature]) -> Vec<u32> {
    let mut ids = Vec::with_capacity(features.len());
    for feature in features {
        let properties = feature
            .properties
            .as_ref()
            .and_then(|v| serde_json::from_value::<FeatureProperties>(v.clone()).ok())
            .unwrap_or_default();
        // Ingest validation guarantees a geometry; skip anything else
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let Some(center) = spatial::bounds_center(&geometry.coordinates) else {
            continue;
        };
        let id = if geometry.r#type == "Point" {
            state.add_marker(center.0, center.1, properties)
        } else {
            state.add_shape(center, None, properties)
        };
        ids.push(id);
    }
    ids
}

// Ingest then register. The registry is only touched once the whole batch
// ingested cleanly, so a failing batch leaves already-rendered state alone.
fn ingest_geometry_into(
    state: &mut MapState,
    rows: &[ingest::GeometryRow],
) -> Result<(LoadSummary, Vec<geometry::Feature>), errors::IngestError> {
    let features = ingest::ingest_geometry_rows(rows)?;
    let entry_ids = register_features(state, &features);
    filter::apply(state);
    Ok((
        LoadSummary {
            rows_seen: rows.len(),
            entries_added: entry_ids.len(),
            entry_ids,
        },
        features,
    ))
}

fn ingest_points_into(
    state: &mut MapState,
    rows: &[ingest::PointRow],
) -> Result<(LoadSummary, Vec<ingest::PointFeature>), errors::IngestError> {
    let points = ingest::ingest_point_rows(rows)?;
    let entry_ids: Vec<u32> = points
        .iter()
        .map(|p| state.add_marker(p.lat, p.lon, p.properties.clone()))
        .collect();
    filter::apply(state);
    Ok((
        LoadSummary {
            rows_seen: rows.len(),
            entries_added: entry_ids.len(),
            entry_ids,
        },
        points,
    ))
}

fn visibility_payload(state: &MapState) -> Result<JsValue, JsValue> {
    let payload = serde_json::json!({
        "styles": state.styles(),
        "filter": state.filter_snapshot(),
    });
    Ok(to_value(&payload)?)
}

/// Load the geometry sheet rows (a JSON array of row objects as produced
/// by the CSV parser). On success the new shapes are registered, a filter
/// pass runs, and the caller gets the normalized FeatureCollection to
/// render plus the entry id for each feature.
#[wasm_bindgen]
pub fn load_geometry_rows(rows_json: &str) -> Result<JsValue, JsValue> {
    let rows: Vec<ingest::GeometryRow> = serde_json::from_str(rows_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse geometry rows: {}", e)))?;

    MapState::with_mut(|state| {
        let (summary, features) = ingest_geometry_into(state, &rows).map_err(|e| {
            console_error!("geometry ingest aborted: {}", e);
            JsValue::from_str(&e.to_string())
        })?;
        console_log!(
            "Loaded {} geometry features from {} rows",
            summary.entries_added,
            summary.rows_seen
        );
        let payload = serde_json::json!({
            "summary": summary,
            "feature_collection": {
                "type": "FeatureCollection",
                "features": features,
            },
        });
        Ok(to_value(&payload)?)
    })
}

/// Load the points sheet rows. Every row becomes a marker; there is no
/// include flag on the points sheet.
#[wasm_bindgen]
pub fn load_point_rows(rows_json: &str) -> Result<JsValue, JsValue> {
    let rows: Vec<ingest::PointRow> = serde_json::from_str(rows_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse point rows: {}", e)))?;

    MapState::with_mut(|state| {
        let (summary, points) = ingest_points_into(state, &rows).map_err(|e| {
            console_error!("point ingest aborted: {}", e);
            JsValue::from_str(&e.to_string())
        })?;
        console_log!("Loaded {} point markers", summary.entries_added);
        let payload = serde_json::json!({
            "summary": summary,
            "points": points,
        });
        Ok(to_value(&payload)?)
    })
}

// Register the background tile layer; it never participates in filtering
#[wasm_bindgen]
pub fn register_tile_background() -> u32 {
    MapState::with_mut(|state| state.add_tile_background())
}

// Geolocation succeeded: center the filter there and reset the radius
#[wasm_bindgen]
pub fn location_found(lat: f64, lng: f64) -> Result<JsValue, JsValue> {
    MapState::with_mut(|state| {
        events::dispatch(state, UserAction::LocationFound { lat, lng });
        visibility_payload(state)
    })
}

// Manual center pick (context-menu click); keeps the current radius
#[wasm_bindgen]
pub fn set_filter_center(lat: f64, lng: f64) -> Result<JsValue, JsValue> {
    MapState::with_mut(|state| {
        events::dispatch(state, UserAction::SetCenter { lat, lng });
        visibility_payload(state)
    })
}

// Double-click: clear the center and show everything again
#[wasm_bindgen]
pub fn clear_filter_center() -> Result<JsValue, JsValue> {
    MapState::with_mut(|state| {
        events::dispatch(state, UserAction::ClearCenter);
        visibility_payload(state)
    })
}

// Toggle the filter as a whole; a disabled filter behaves like no center
#[wasm_bindgen]
pub fn set_filter_enabled(enabled: bool) -> Result<JsValue, JsValue> {
    MapState::with_mut(|state| {
        state.filter.enabled = enabled;
        filter::apply(state);
        visibility_payload(state)
    })
}

// Current per-entry styles plus filter state, without changing anything
#[wasm_bindgen]
pub fn get_visibility_snapshot() -> Result<JsValue, JsValue> {
    MapState::with(visibility_payload)
}

#[wasm_bindgen]
pub fn get_filter_state() -> Result<JsValue, JsValue> {
    MapState::with(|state| Ok(to_value(&state.filter_snapshot())?))
}

/// Sidebar lookup for a clicked entry. Returns undefined for unknown ids
/// and for the tile background, which carries no metadata.
#[wasm_bindgen]
pub fn get_entry_info(id: u32) -> Result<JsValue, JsValue> {
    MapState::with(|state| match state.entry_info(id) {
        Some(info) => Ok(to_value(&info)?),
        None => Ok(JsValue::UNDEFINED),
    })
}

// Function to get registry statistics
#[wasm_bindgen]
pub fn registry_stats() -> Result<JsValue, JsValue> {
    MapState::with(|state| Ok(to_value(&state.stats())?))
}

// Drop every entry (a reload re-adds layers; there is no deduplication)
#[wasm_bindgen]
pub fn clear_registry() -> bool {
    MapState::with_mut(|state| {
        state.clear_entries();
        true
    })
}

// Initial view for the JS bootstrap
#[wasm_bindgen]
pub fn default_view() -> Result<JsValue, JsValue> {
    let payload = serde_json::json!({
        "lat": models::DEFAULT_VIEW_LAT,
        "lng": models::DEFAULT_VIEW_LNG,
        "zoom": models::DEFAULT_VIEW_ZOOM,
    });
    Ok(to_value(&payload)?)
}

// Base style for geometry layers; its fill_opacity is the value the
// filter restores on reset
#[wasm_bindgen]
pub fn default_shape_style() -> Result<JsValue, JsValue> {
    Ok(to_value(&ShapeStyle::default_geometry())?)
}

#[wasm_bindgen]
pub fn default_shape_hover_style() -> Result<JsValue, JsValue> {
    Ok(to_value(&ShapeStyle::default_geometry_hover())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_features_splits_points_from_shapes() {
        let rows = vec![
            ingest::GeometryRow {
                include: "y".to_string(),
                geometry: "[23.73, 37.98]".to_string(),
                name: "a point".to_string(),
                description: String::new(),
            },
            ingest::GeometryRow {
                include: "y".to_string(),
                geometry: "[[[23.0,37.0],[24.0,37.0],[24.0,38.0]]]".to_string(),
                name: "a polygon".to_string(),
                description: String::new(),
            },
        ];
        let features = ingest::ingest_geometry_rows(&rows).unwrap();

        let mut state = MapState::new();
        let ids = register_features(&mut state, &features);
        assert_eq!(ids.len(), 2);
        let stats = state.stats();
        assert_eq!(stats.markers, 1);
        assert_eq!(stats.shapes, 1);
        assert_eq!(state.entry_info(ids[1]).unwrap().name, "a polygon");
    }

    #[test]
    fn failed_geometry_batch_leaves_prior_registry_content_intact() {
        let mut state = MapState::new();
        state.add_marker(37.9755, 23.7349, FeatureProperties::default());
        state.add_shape((37.976, 23.736), Some(0.5), FeatureProperties::default());
        let stats_before = state.stats();
        let styles_before = state.styles();

        let rows = vec![
            ingest::GeometryRow {
                include: "y".to_string(),
                geometry: "[[0.0,0.0],[1.0,1.0]]".to_string(),
                name: "fine".to_string(),
                description: String::new(),
            },
            ingest::GeometryRow {
                include: "y".to_string(),
                geometry: "{broken".to_string(),
                name: "bad".to_string(),
                description: String::new(),
            },
        ];
        assert!(ingest_geometry_into(&mut state, &rows).is_err());

        assert_eq!(state.stats(), stats_before);
        assert_eq!(state.styles(), styles_before);
    }

    #[test]
    fn failed_point_batch_leaves_prior_registry_content_intact() {
        let mut state = MapState::new();
        state.add_marker(37.9755, 23.7349, FeatureProperties::default());
        let stats_before = state.stats();

        let rows: Vec<ingest::PointRow> = serde_json::from_value(json!([
            { "lat": 38.0, "lon": 23.8, "name": "ok", "description": "" },
            { "lat": "somewhere", "lon": 23.8, "name": "bad", "description": "" }
        ]))
        .unwrap();
        assert!(ingest_points_into(&mut state, &rows).is_err());

        assert_eq!(state.stats(), stats_before);
    }

    #[test]
    fn registered_shape_center_is_the_bounding_box_center() {
        let features = geometry::normalize(&json!([[[23.0, 37.0], [24.0, 37.0], [24.0, 38.0], [23.0, 38.0]]])).unwrap();
        let mut state = MapState::new();
        register_features(&mut state, &features);
        match &state.entries[0] {
            registry::RenderableEntry::Shape { center, .. } => {
                assert!((center.0 - 37.5).abs() < 1e-9);
                assert!((center.1 - 23.5).abs() < 1e-9);
            }
            other => panic!("expected a shape, got {:?}", other.kind_str()),
        }
    }
}
