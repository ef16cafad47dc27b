// The proximity filter: one pass classifies every renderable entry as
// visible or hidden relative to the filter center and keeps the ring
// indicator in sync. Entries are restyled in place, never removed, so the
// JS side only has to toggle opacity on existing layers.
use crate::registry::{FilterRing, MapState, RenderableEntry, DEFAULT_FILL_OPACITY};
use crate::spatial;

/// Apply the proximity filter to the whole registry. With the filter
/// disabled or no center chosen this is the reset path: everything back to
/// full opacity and the ring removed.
pub fn apply(state: &mut MapState) {
    let filter = state.filter.clone();
    let center = match filter.center {
        Some(center) if filter.enabled => center,
        _ => {
            reset(state);
            return;
        }
    };

    // Keep or draw the ring indicator
    let radius_m = filter.radius_km * 1000.0;
    match &mut state.ring {
        Some(ring) => {
            ring.center = center;
            ring.radius_m = radius_m;
        }
        None => {
            state.ring = Some(FilterRing { center, radius_m });
        }
    }

    for entry in &mut state.entries {
        match entry {
            RenderableEntry::Marker { lat, lng, opacity, .. } => {
                let distance = spatial::distance_km(center, (*lat, *lng));
                // Inclusive boundary: a marker exactly on the radius stays visible
                *opacity = if distance <= filter.radius_km { 1.0 } else { 0.0 };
            }
            RenderableEntry::Shape {
                center: representative,
                base_fill_opacity,
                opacity,
                fill_opacity,
                ..
            } => {
                let distance = spatial::distance_km(center, *representative);
                let visible = distance <= filter.radius_km;
                *opacity = if visible { 1.0 } else { 0.0 };
                *fill_opacity = if visible {
                    base_fill_opacity.unwrap_or(DEFAULT_FILL_OPACITY)
                } else {
                    0.0
                };
            }
            RenderableEntry::TileBackground { .. } => {}
        }
    }
}

// Show everything and drop the ring
fn reset(state: &mut MapState) {
    for entry in &mut state.entries {
        match entry {
            RenderableEntry::Marker { opacity, .. } => {
                *opacity = 1.0;
            }
            RenderableEntry::Shape {
                base_fill_opacity,
                opacity,
                fill_opacity,
                ..
            } => {
                *opacity = 1.0;
                *fill_opacity = base_fill_opacity.unwrap_or(DEFAULT_FILL_OPACITY);
            }
            RenderableEntry::TileBackground { .. } => {}
        }
    }
    state.ring = None;
}
