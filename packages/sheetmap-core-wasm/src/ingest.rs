// Row ingest: converts the parsed sheet rows handed over by the JS side
// into validated feature collections. Both ingestors abort the whole batch
// on the first bad row; callers only touch the registry on success, so a
// failed batch never corrupts already-rendered state.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::IngestError;
use crate::geometry::{self, Feature};
use crate::models::FeatureProperties;

// A row of the geometry sheet. The geometry cell is a JSON-encoded string
// authored by hand, hence the normalization step.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct GeometryRow {
    #[serde(default)]
    pub include: String,
    #[serde(default)]
    pub geometry: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// A row of the points sheet. Sheets deliver lat/lon as strings more often
// than numbers, so both are accepted.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PointRow {
    #[serde(default)]
    pub lat: Value,
    #[serde(default)]
    pub lon: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// A validated point with its metadata
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PointFeature {
    pub lat: f64,
    pub lon: f64,
    pub properties: FeatureProperties,
}

/// Ingest geometry rows: rows flagged include == "y" (exact match) have
/// their geometry cell parsed, normalized and validated; every resulting
/// feature gets the row's name/description stamped over whatever
/// properties it carried. Other rows are skipped silently.
pub fn ingest_geometry_rows(rows: &[GeometryRow]) -> Result<Vec<Feature>, IngestError> {
    let mut features = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        if row.include != "y" {
            continue;
        }

        let payload: Value = serde_json::from_str(&row.geometry).map_err(|e| {
            IngestError::MalformedGeometryPayload {
                row: row_index,
                message: e.to_string(),
            }
        })?;

        let normalized = geometry::normalize(&payload)
            .map_err(|source| IngestError::Geometry { row: row_index, source })?;

        let properties = serde_json::json!({
            "name": row.name,
            "description": row.description,
        });

        for mut feature in normalized {
            geometry::validate(&feature)
                .map_err(|source| IngestError::Geometry { row: row_index, source })?;
            // Row metadata overrides any properties already present
            feature.properties = Some(properties.clone());
            features.push(feature);
        }
    }

    Ok(features)
}

/// Ingest point rows: every row becomes a PointFeature, no include flag
/// applies (the points sheet has no such column).
pub fn ingest_point_rows(rows: &[PointRow]) -> Result<Vec<PointFeature>, IngestError> {
    let mut points = Vec::with_capacity(rows.len());

    for (row_index, row) in rows.iter().enumerate() {
        let lat = coerce_coordinate(&row.lat, row_index, "lat")?;
        let lon = coerce_coordinate(&row.lon, row_index, "lon")?;
        points.push(PointFeature {
            lat,
            lon,
            properties: FeatureProperties {
                name: row.name.clone(),
                description: row.description.clone(),
            },
        });
    }

    Ok(points)
}

// Accept a JSON number or a numeric string
fn coerce_coordinate(value: &Value, row: usize, field: &str) -> Result<f64, IngestError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or_else(|| IngestError::InvalidCoordinate {
        row,
        field: field.to_string(),
        message: format!("cannot read '{}' as a number", value),
    })
}
