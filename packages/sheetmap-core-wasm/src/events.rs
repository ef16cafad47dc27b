// User-action dispatch: each named action is a state transition on the
// filter, followed by exactly one filter pass. The transition is fully
// applied before the pass starts, which is all the ordering the
// single-writer model needs.
use crate::filter;
use crate::registry::{MapState, DEFAULT_RADIUS_KM};

// The user-triggered events that move the filter center around
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UserAction {
    // Geolocation succeeded; also resets the radius to the default
    LocationFound { lat: f64, lng: f64 },
    // Manual pick (context-menu click); keeps the current radius
    SetCenter { lat: f64, lng: f64 },
    // Double-click; drops the center and un-hides everything
    ClearCenter,
}

pub fn dispatch(state: &mut MapState, action: UserAction) {
    match action {
        UserAction::LocationFound { lat, lng } => {
            state.filter.center = Some((lat, lng));
            state.filter.radius_km = DEFAULT_RADIUS_KM;
        }
        UserAction::SetCenter { lat, lng } => {
            state.filter.center = Some((lat, lng));
        }
        UserAction::ClearCenter => {
            state.filter.center = None;
        }
    }
    filter::apply(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureProperties;

    const ATHENS: (f64, f64) = (37.9755, 23.7349);

    #[test]
    fn location_found_sets_center_and_resets_radius() {
        let mut state = MapState::new();
        state.filter.radius_km = 10.0;
        dispatch(
            &mut state,
            UserAction::LocationFound { lat: ATHENS.0, lng: ATHENS.1 },
        );
        assert_eq!(state.filter.center, Some(ATHENS));
        assert!((state.filter.radius_km - DEFAULT_RADIUS_KM).abs() < 1e-9);
        assert!(state.ring.is_some());
    }

    #[test]
    fn manual_center_pick_keeps_the_current_radius() {
        let mut state = MapState::new();
        state.filter.radius_km = 7.5;
        dispatch(&mut state, UserAction::SetCenter { lat: 38.0, lng: 23.8 });
        assert_eq!(state.filter.center, Some((38.0, 23.8)));
        assert!((state.filter.radius_km - 7.5).abs() < 1e-9);
    }

    #[test]
    fn the_filter_pass_sees_the_completed_transition() {
        let mut state = MapState::new();
        dispatch(&mut state, UserAction::SetCenter { lat: 38.0, lng: 23.8 });
        // The ring was drawn from the new center, not a stale one
        assert_eq!(state.ring.as_ref().unwrap().center, (38.0, 23.8));
    }

    #[test]
    fn clear_center_restores_visibility() {
        let mut state = MapState::new();
        let far = state.add_marker(38.05, 23.9, FeatureProperties::default());
        dispatch(
            &mut state,
            UserAction::LocationFound { lat: ATHENS.0, lng: ATHENS.1 },
        );
        let hidden = state
            .styles()
            .into_iter()
            .find(|s| s.id == far)
            .unwrap()
            .opacity;
        assert!(hidden.abs() < 1e-9);

        dispatch(&mut state, UserAction::ClearCenter);
        assert!(state.filter.center.is_none());
        assert!(state.ring.is_none());
        let restored = state
            .styles()
            .into_iter()
            .find(|s| s.id == far)
            .unwrap()
            .opacity;
        assert!((restored - 1.0).abs() < 1e-9);
    }
}
