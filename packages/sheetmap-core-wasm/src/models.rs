// This is the models module containing the shared data structures that
// cross the wasm boundary as plain JS objects.
use serde::{Deserialize, Serialize};

// Default view used by the JS bootstrap before any data arrives (Athens)
pub const DEFAULT_VIEW_LAT: f64 = 37.9755;
pub const DEFAULT_VIEW_LNG: f64 = 23.7349;
pub const DEFAULT_VIEW_ZOOM: u32 = 14;

// Name/description metadata stamped onto every ingested feature
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FeatureProperties {
    pub name: String,
    pub description: String,
}

// Per-entry style after a filter pass; the JS side applies these via
// setOpacity / setStyle on the corresponding layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntryStyle {
    pub id: u32,
    pub kind: String, // "marker" | "shape" | "tile"
    pub opacity: f64,
    pub fill_opacity: Option<f64>, // shapes only
}

// Snapshot of the filter ring indicator for the JS side to draw
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RingSnapshot {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
    pub color: String,
    pub fill_opacity: f64,
}

// Snapshot of the whole filter state
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FilterSnapshot {
    pub enabled: bool,
    pub radius_km: f64,
    pub center: Option<(f64, f64)>,
    pub ring: Option<RingSnapshot>,
}

// Result of a row-loading call
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoadSummary {
    pub rows_seen: usize,
    pub entries_added: usize,
    pub entry_ids: Vec<u32>,
}

// Sidebar payload for a clicked entry
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EntryInfo {
    pub id: u32,
    pub name: String,
    pub description: String,
}

// Registry counts, mostly for diagnostics
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RegistryStats {
    pub markers: usize,
    pub shapes: usize,
    pub tiles: usize,
}

// Base style the JS side applies to geometry layers; fill_opacity here is
// the base value the filter restores on reset.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShapeStyle {
    pub color: String,
    pub fill_color: String,
    pub weight: u32,
    pub fill_opacity: f64,
}

impl ShapeStyle {
    pub fn default_geometry() -> Self {
        ShapeStyle {
            color: "#2ca25f".to_string(),
            fill_color: "#99d8c9".to_string(),
            weight: 2,
            fill_opacity: 0.3,
        }
    }

    pub fn default_geometry_hover() -> Self {
        ShapeStyle {
            color: "green".to_string(),
            fill_color: "#2ca25f".to_string(),
            weight: 3,
            fill_opacity: 0.3,
        }
    }
}
