use thiserror::Error;

// Errors raised while coercing a geometry payload into strict features
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

// Errors raised by the row ingest pipeline. Every variant carries the
// offending row index so the caller can point at the sheet line.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("row {row}: malformed geometry payload: {message}")]
    MalformedGeometryPayload { row: usize, message: String },

    #[error("row {row}: invalid coordinate in '{field}': {message}")]
    InvalidCoordinate {
        row: usize,
        field: String,
        message: String,
    },

    #[error("row {row}: {source}")]
    Geometry {
        row: usize,
        #[source]
        source: GeometryError,
    },
}

impl IngestError {
    // Row index the error originated from (0-based, data rows only)
    pub fn row(&self) -> usize {
        match self {
            IngestError::MalformedGeometryPayload { row, .. } => *row,
            IngestError::InvalidCoordinate { row, .. } => *row,
            IngestError::Geometry { row, .. } => *row,
        }
    }
}
