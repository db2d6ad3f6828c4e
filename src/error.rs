use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which side of the parcel/assessment join a problem was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Geometry,
    Attributes,
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::Geometry => write!(f, "geometry"),
            JoinSide::Attributes => write!(f, "attributes"),
        }
    }
}

/// Failure while building the merged dataset. Any of these aborts the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("parcel shapefile not found: {}", path.display())]
    GeometrySourceMissing { path: PathBuf },

    #[error("failed to read parcel shapefile {}: {reason}", path.display())]
    GeometrySourceCorrupt { path: PathBuf, reason: String },

    #[error("parcel CRS could not be determined from {}: {reason}", path.display())]
    CrsUndetermined { path: PathBuf, reason: String },

    #[error("failed to reproject parcels to EPSG:4326: {reason}")]
    ReprojectionFailed { reason: String },

    #[error("join key column {column:?} not found in {side} source (available: {available:?})")]
    JoinKeyMissing { side: JoinSide, column: String, available: Vec<String> },

    #[error("assessment file not found: {}", path.display())]
    AttributeSourceMissing { path: PathBuf },

    #[error("failed to read assessment file {}: {reason}", path.display())]
    AttributeSourceCorrupt { path: PathBuf, reason: String },

    #[error("failed to merge parcels with assessment records: {reason}")]
    Merge { reason: String },
}

impl LoadError {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::GeometrySourceMissing { .. } => "GeometrySourceMissing",
            LoadError::GeometrySourceCorrupt { .. } => "GeometrySourceCorrupt",
            LoadError::CrsUndetermined { .. } => "CrsUndetermined",
            LoadError::ReprojectionFailed { .. } => "ReprojectionFailed",
            LoadError::JoinKeyMissing { .. } => "JoinKeyMissing",
            LoadError::AttributeSourceMissing { .. } => "AttributeSourceMissing",
            LoadError::AttributeSourceCorrupt { .. } => "AttributeSourceCorrupt",
            LoadError::Merge { .. } => "Merge",
        }
    }
}

/// Failure of a single-PIN lookup. These are caller-visible values, never panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Data not loaded")]
    DataUnavailable,

    #[error("PIN {pin} not found (data empty after load/clean).")]
    DataEmpty { pin: String },

    #[error("PIN {pin} not found")]
    PinNotFound { pin: String },
}

/// Render an `anyhow` chain as a single line for a `reason` field.
pub(crate) fn chain(err: &anyhow::Error) -> String {
    format!("{err:#}")
}
