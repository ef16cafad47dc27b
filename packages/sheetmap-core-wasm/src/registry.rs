// Registry of renderable map entries plus the proximity-filter state.
// Core functions take &mut MapState explicitly; the process-wide instance
// only exists behind the wasm export surface.
use lazy_static::lazy_static;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;

use crate::models::{
    EntryInfo, EntryStyle, FeatureProperties, FilterSnapshot, RegistryStats, RingSnapshot,
};

// Base fill opacity restored on shapes that never configured one
pub const DEFAULT_FILL_OPACITY: f64 = 0.3;

// Radius applied whenever a locate event fires
pub const DEFAULT_RADIUS_KM: f64 = 3.0;

// Ring indicator style
pub const RING_COLOR: &str = "green";
pub const RING_FILL_OPACITY: f64 = 0.1;

// A rendered map object participating in visibility filtering. Tile
// backgrounds carry no representative point and no visibility styling, so
// the filter has nothing to do with them structurally.
#[derive(Clone, Debug)]
pub enum RenderableEntry {
    Marker {
        id: u32,
        lat: f64,
        lng: f64,
        opacity: f64,
        properties: FeatureProperties,
    },
    Shape {
        id: u32,
        // Bounding-box center, precomputed when the shape is added
        center: (f64, f64),
        base_fill_opacity: Option<f64>,
        opacity: f64,
        fill_opacity: f64,
        properties: FeatureProperties,
    },
    TileBackground {
        id: u32,
    },
}

impl RenderableEntry {
    pub fn id(&self) -> u32 {
        match self {
            RenderableEntry::Marker { id, .. } => *id,
            RenderableEntry::Shape { id, .. } => *id,
            RenderableEntry::TileBackground { id } => *id,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            RenderableEntry::Marker { .. } => "marker",
            RenderableEntry::Shape { .. } => "shape",
            RenderableEntry::TileBackground { .. } => "tile",
        }
    }

    pub fn style(&self) -> EntryStyle {
        match self {
            RenderableEntry::Marker { id, opacity, .. } => EntryStyle {
                id: *id,
                kind: "marker".to_string(),
                opacity: *opacity,
                fill_opacity: None,
            },
            RenderableEntry::Shape {
                id,
                opacity,
                fill_opacity,
                ..
            } => EntryStyle {
                id: *id,
                kind: "shape".to_string(),
                opacity: *opacity,
                fill_opacity: Some(*fill_opacity),
            },
            RenderableEntry::TileBackground { id } => EntryStyle {
                id: *id,
                kind: "tile".to_string(),
                opacity: 1.0,
                fill_opacity: None,
            },
        }
    }
}

// State of the proximity filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    pub enabled: bool,
    pub radius_km: f64,
    pub center: Option<(f64, f64)>,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            enabled: true,
            radius_km: DEFAULT_RADIUS_KM,
            center: None,
        }
    }
}

// The single visual filter-radius circle; exists only while a center is set
#[derive(Clone, Debug, PartialEq)]
pub struct FilterRing {
    pub center: (f64, f64),
    pub radius_m: f64,
}

impl FilterRing {
    pub fn snapshot(&self) -> RingSnapshot {
        RingSnapshot {
            lat: self.center.0,
            lng: self.center.1,
            radius_m: self.radius_m,
            color: RING_COLOR.to_string(),
            fill_opacity: RING_FILL_OPACITY,
        }
    }
}

// The whole mutable map-side state: rendered entries, filter state and the
// lazily created ring indicator.
pub struct MapState {
    pub entries: Vec<RenderableEntry>,
    pub filter: FilterState,
    pub ring: Option<FilterRing>,
    next_id: u32,
}

// Create a global static instance of the map state
lazy_static! {
    static ref MAP_STATE: ReentrantMutex<RefCell<MapState>> =
        ReentrantMutex::new(RefCell::new(MapState::new()));
}

impl MapState {
    pub fn new() -> Self {
        MapState {
            entries: Vec::new(),
            filter: FilterState::default(),
            ring: None,
            next_id: 0,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut MapState) -> R,
    {
        let guard = MAP_STATE.lock();
        let mut borrow = guard.borrow_mut();
        f(&mut borrow)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&MapState) -> R,
    {
        let guard = MAP_STATE.lock();
        let borrow = guard.borrow();
        f(&borrow)
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // Add a point marker, fully visible until a filter pass says otherwise
    pub fn add_marker(&mut self, lat: f64, lng: f64, properties: FeatureProperties) -> u32 {
        let id = self.allocate_id();
        self.entries.push(RenderableEntry::Marker {
            id,
            lat,
            lng,
            opacity: 1.0,
            properties,
        });
        id
    }

    // Add a shape with its precomputed bounding-box center
    pub fn add_shape(
        &mut self,
        center: (f64, f64),
        base_fill_opacity: Option<f64>,
        properties: FeatureProperties,
    ) -> u32 {
        let id = self.allocate_id();
        self.entries.push(RenderableEntry::Shape {
            id,
            center,
            base_fill_opacity,
            opacity: 1.0,
            fill_opacity: base_fill_opacity.unwrap_or(DEFAULT_FILL_OPACITY),
            properties,
        });
        id
    }

    // Register the background tile layer so it shows up in snapshots but
    // never participates in filtering
    pub fn add_tile_background(&mut self) -> u32 {
        let id = self.allocate_id();
        self.entries.push(RenderableEntry::TileBackground { id });
        id
    }

    // Sidebar lookup for a clicked entry; tiles have no metadata
    pub fn entry_info(&self, id: u32) -> Option<EntryInfo> {
        self.entries.iter().find(|e| e.id() == id).and_then(|e| match e {
            RenderableEntry::Marker { properties, .. }
            | RenderableEntry::Shape { properties, .. } => Some(EntryInfo {
                id,
                name: properties.name.clone(),
                description: properties.description.clone(),
            }),
            RenderableEntry::TileBackground { .. } => None,
        })
    }

    pub fn styles(&self) -> Vec<EntryStyle> {
        self.entries.iter().map(RenderableEntry::style).collect()
    }

    pub fn filter_snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            enabled: self.filter.enabled,
            radius_km: self.filter.radius_km,
            center: self.filter.center,
            ring: self.ring.as_ref().map(FilterRing::snapshot),
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            markers: 0,
            shapes: 0,
            tiles: 0,
        };
        for entry in &self.entries {
            match entry {
                RenderableEntry::Marker { .. } => stats.markers += 1,
                RenderableEntry::Shape { .. } => stats.shapes += 1,
                RenderableEntry::TileBackground { .. } => stats.tiles += 1,
            }
        }
        stats
    }

    pub fn clear_entries(&mut self) {
        self.entries.clear();
        self.ring = None;
    }
}

impl Default for MapState {
    fn default() -> Self {
        MapState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(name: &str) -> FeatureProperties {
        FeatureProperties {
            name: name.to_string(),
            description: format!("{} description", name),
        }
    }

    #[test]
    fn filter_state_defaults() {
        let state = FilterState::default();
        assert!(state.enabled);
        assert!((state.radius_km - 3.0).abs() < 1e-9);
        assert!(state.center.is_none());
    }

    #[test]
    fn ids_are_unique_across_entry_kinds() {
        let mut state = MapState::new();
        let a = state.add_marker(37.0, 23.0, props("a"));
        let b = state.add_tile_background();
        let c = state.add_shape((37.5, 23.5), None, props("c"));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(state.entries.len(), 3);
    }

    #[test]
    fn entry_info_resolves_markers_and_shapes_but_not_tiles() {
        let mut state = MapState::new();
        let marker = state.add_marker(37.0, 23.0, props("marker"));
        let tile = state.add_tile_background();
        let shape = state.add_shape((37.5, 23.5), Some(0.5), props("shape"));

        assert_eq!(state.entry_info(marker).unwrap().name, "marker");
        assert_eq!(state.entry_info(shape).unwrap().name, "shape");
        assert!(state.entry_info(tile).is_none());
        assert!(state.entry_info(999).is_none());
    }

    #[test]
    fn new_shape_starts_at_its_base_fill() {
        let mut state = MapState::new();
        state.add_shape((0.0, 0.0), Some(0.7), props("a"));
        state.add_shape((0.0, 0.0), None, props("b"));
        let styles = state.styles();
        assert!((styles[0].fill_opacity.unwrap() - 0.7).abs() < 1e-9);
        assert!((styles[1].fill_opacity.unwrap() - DEFAULT_FILL_OPACITY).abs() < 1e-9);
    }

    #[test]
    fn stats_count_by_kind() {
        let mut state = MapState::new();
        state.add_marker(0.0, 0.0, props("m"));
        state.add_marker(1.0, 1.0, props("n"));
        state.add_tile_background();
        let stats = state.stats();
        assert_eq!(stats.markers, 2);
        assert_eq!(stats.shapes, 0);
        assert_eq!(stats.tiles, 1);
    }
}
