// Geometry normalization: coerces the loosely-typed, user-authored payloads
// found in sheet cells (full GeoJSON, bare geometries, raw coordinate
// arrays) into strict Feature values.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::GeometryError;

// The geometry kinds the registry knows how to render
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }

    pub fn from_type_str(s: &str) -> Option<GeometryKind> {
        match s {
            "Point" => Some(GeometryKind::Point),
            "LineString" => Some(GeometryKind::LineString),
            "Polygon" => Some(GeometryKind::Polygon),
            "MultiPolygon" => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }

    // Levels of array nesting around the numeric pair for this kind
    pub fn expected_depth(&self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
            GeometryKind::MultiPolygon => 4,
        }
    }
}

// Geometry part of a feature. Foreign members (bbox etc.) are kept so
// pass-through inputs survive a round trip unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Geometry {
    pub r#type: String,
    pub coordinates: Value, // Using Value for flexibility with different geometry types
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// GeoJSON-like feature structure. `geometry` may be null in authored
// GeoJSON; such features pass through normalization and are only rejected
// by the strict validation the ingest path runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Feature {
    pub r#type: String,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    pub fn from_geometry(geometry: Geometry) -> Feature {
        Feature {
            r#type: "Feature".to_string(),
            geometry: Some(geometry),
            properties: None,
            extra: Map::new(),
        }
    }
}

/// Accepts any GeoJSON-ish value and returns a list of Features.
/// Priority dispatch: FeatureCollection and Feature inputs pass through,
/// bare geometries get wrapped, and raw coordinate arrays have their kind
/// guessed from nesting depth.
pub fn normalize(value: &Value) -> Result<Vec<Feature>, GeometryError> {
    if let Some(type_name) = value.get("type").and_then(Value::as_str) {
        // FeatureCollection
        if type_name == "FeatureCollection" {
            let features = value
                .get("features")
                .ok_or_else(|| {
                    GeometryError::InvalidGeometry(
                        "FeatureCollection without 'features' field".to_string(),
                    )
                })?
                .clone();
            return serde_json::from_value::<Vec<Feature>>(features)
                .map_err(|e| GeometryError::InvalidGeometry(format!("bad feature list: {}", e)));
        }
        // Feature
        if type_name == "Feature" {
            let feature = serde_json::from_value::<Feature>(value.clone())
                .map_err(|e| GeometryError::InvalidGeometry(format!("bad feature: {}", e)))?;
            return Ok(vec![feature]);
        }
        // Bare geometry
        let geometry = serde_json::from_value::<Geometry>(value.clone())
            .map_err(|e| GeometryError::InvalidGeometry(format!("bad geometry: {}", e)))?;
        return Ok(vec![Feature::from_geometry(geometry)]);
    }

    // Raw coordinates: infer the kind from the nesting depth
    if value.is_array() {
        let kind = infer_kind(value)?;
        return Ok(vec![Feature::from_geometry(Geometry {
            r#type: kind.as_str().to_string(),
            coordinates: value.clone(),
            extra: Map::new(),
        })]);
    }

    Err(GeometryError::InvalidGeometry(
        "payload is neither a typed GeoJSON object nor a coordinate array".to_string(),
    ))
}

// Guess the geometry kind from the nesting depth of the first-element
// chain. Depth 1 is a Point, 2 a LineString, 3 a Polygon; anything deeper
// falls back to MultiPolygon. This is a heuristic, not a depth guarantee:
// a depth-5 array still infers MultiPolygon here and is only rejected by
// the strict validation pass.
fn infer_kind(value: &Value) -> Result<GeometryKind, GeometryError> {
    let depth = probe_depth(value)?;
    Ok(match depth {
        1 => GeometryKind::Point,
        2 => GeometryKind::LineString,
        3 => GeometryKind::Polygon,
        _ => GeometryKind::MultiPolygon,
    })
}

// Walk the first-element chain counting array levels until a number shows
// up. Empty arrays and non-numeric leaves make the probe fail instead of
// silently defaulting.
fn probe_depth(value: &Value) -> Result<usize, GeometryError> {
    let mut current = value;
    let mut depth = 0;
    loop {
        match current {
            Value::Number(_) => return Ok(depth),
            Value::Array(items) => {
                depth += 1;
                current = items.first().ok_or_else(|| {
                    GeometryError::InvalidGeometry(format!(
                        "empty coordinate array at depth {}",
                        depth
                    ))
                })?;
            }
            other => {
                return Err(GeometryError::InvalidGeometry(format!(
                    "expected number or array in coordinates, found {}",
                    json_type_name(other)
                )))
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strict validation of the kind/coordinates invariant: the nesting depth
/// must match the kind exactly and every position must be a pair of
/// numbers (extra numeric members like altitude are tolerated).
pub fn validate(feature: &Feature) -> Result<(), GeometryError> {
    let geometry = feature.geometry.as_ref().ok_or_else(|| {
        GeometryError::InvalidGeometry("feature has no geometry".to_string())
    })?;
    let kind = GeometryKind::from_type_str(&geometry.r#type).ok_or_else(|| {
        GeometryError::InvalidGeometry(format!(
            "unsupported geometry type '{}'",
            geometry.r#type
        ))
    })?;
    check_nesting(&geometry.coordinates, kind.expected_depth()).map_err(|e| {
        GeometryError::InvalidGeometry(format!("{} coordinates: {}", kind.as_str(), e))
    })
}

// Recursively check that `levels` array levels wrap a numeric position
fn check_nesting(value: &Value, levels: usize) -> Result<(), String> {
    if levels == 1 {
        return check_position(value);
    }
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(format!("empty array at nesting level {}", levels));
            }
            for item in items {
                check_nesting(item, levels - 1)?;
            }
            Ok(())
        }
        other => Err(format!(
            "expected array at nesting level {}, found {}",
            levels,
            json_type_name(other)
        )),
    }
}

fn check_position(value: &Value) -> Result<(), String> {
    match value {
        Value::Array(items) => {
            if items.len() < 2 {
                return Err("position needs at least two numbers".to_string());
            }
            if items.iter().any(|v| !v.is_number()) {
                return Err("position contains a non-numeric member".to_string());
            }
            Ok(())
        }
        other => Err(format!("expected position array, found {}", json_type_name(other))),
    }
}
