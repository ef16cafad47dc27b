// Spatial helpers shared by the proximity filter: great-circle distance
// between two lat/lng pairs and the bounding-box center of a nested
// GeoJSON coordinate array.
use geo::{Distance, Haversine};
use geo_types::Point;
use serde_json::Value;

// Great-circle distance in kilometers between two (lat, lng) pairs
pub fn distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    // geo points are (x=lng, y=lat)
    let from = Point::new(a.1, a.0);
    let to = Point::new(b.1, b.0);
    Haversine::distance(from, to) / 1000.0
}

// Compute the bounding-box center of a nested coordinate array as a
// (lat, lng) pair. Positions are GeoJSON order [lng, lat]. Returns None
// when the array holds no positions at all.
pub fn bounds_center(coordinates: &Value) -> Option<(f64, f64)> {
    let mut min_lng = f64::INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    accumulate_bounds(
        coordinates,
        &mut min_lng,
        &mut min_lat,
        &mut max_lng,
        &mut max_lat,
    );

    if min_lng.is_infinite() {
        return None;
    }
    Some(((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0))
}

// Walk arbitrarily nested arrays; any array whose first element is a
// number is treated as a [lng, lat, ...] position.
fn accumulate_bounds(
    value: &Value,
    min_lng: &mut f64,
    min_lat: &mut f64,
    max_lng: &mut f64,
    max_lat: &mut f64,
) {
    let Value::Array(items) = value else {
        return;
    };
    if items.first().map(|v| v.is_number()).unwrap_or(false) {
        if let (Some(lng), Some(lat)) = (
            items.first().and_then(Value::as_f64),
            items.get(1).and_then(Value::as_f64),
        ) {
            *min_lng = min_lng.min(lng);
            *min_lat = min_lat.min(lat);
            *max_lng = max_lng.max(lng);
            *max_lat = max_lat.max(lat);
        }
        return;
    }
    for item in items {
        accumulate_bounds(item, min_lng, min_lat, max_lng, max_lat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn distance_to_self_is_zero() {
        let athens = (37.9755, 23.7349);
        assert!(distance_km(athens, athens).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = (37.9755, 23.7349);
        let b = (38.05, 23.9);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        // ~111.195 km with the mean earth radius
        let d = distance_km((0.0, 0.0), (0.0, 1.0));
        assert!((d - 111.195).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn athens_suburb_is_roughly_eighteen_km_out() {
        let d = distance_km((37.9755, 23.7349), (38.05, 23.9));
        assert!((15.0..22.0).contains(&d), "got {}", d);
    }

    #[test]
    fn center_of_a_polygon_ring() {
        // lng 23.0..24.0, lat 37.0..38.0
        let coords = json!([[[23.0, 37.0], [24.0, 37.0], [24.0, 38.0], [23.0, 38.0]]]);
        let (lat, lng) = bounds_center(&coords).unwrap();
        assert!((lat - 37.5).abs() < 1e-9);
        assert!((lng - 23.5).abs() < 1e-9);
    }

    #[test]
    fn center_of_a_bare_point() {
        let (lat, lng) = bounds_center(&json!([23.73, 37.98])).unwrap();
        assert!((lat - 37.98).abs() < 1e-9);
        assert!((lng - 23.73).abs() < 1e-9);
    }

    #[test]
    fn center_of_nothing_is_none() {
        assert!(bounds_center(&json!([])).is_none());
        assert!(bounds_center(&json!("x")).is_none());
    }
}
