//! Dashboard configuration.
//!
//! Defaults reproduce the King County dashboard; a YAML file can override any field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geom::BoundingBox;

/// Complete configuration: where the data lives and how the homepage is framed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourceConfig,
    pub view: ViewConfig,
}

/// Locations and join-key names of the two source datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Parcel polygons (`.shp`, with `.shx`, `.dbf` and `.prj` alongside).
    pub parcels: PathBuf,
    /// Assessment records (CSV with header row).
    pub assessments: PathBuf,
    /// Join-key column in the shapefile attribute table.
    pub parcel_pin_column: String,
    /// Join-key column in the assessment CSV.
    pub assessment_pin_column: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            parcels: PathBuf::from("data").join("parcel.shp"),
            assessments: PathBuf::from("data").join("kc_assessment_data.csv"),
            parcel_pin_column: "PIN".to_string(),
            assessment_pin_column: "PIN".to_string(),
        }
    }
}

/// Homepage framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub title: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    /// Parcels embedded in the homepage are limited to this box.
    pub default_bounds: BoundingBox,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "King County Real Estate Dashboard".to_string(),
            center_lat: 47.6062,
            center_lon: -122.3321,
            zoom: 9,
            default_bounds: BoundingBox::BELLEVUE,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        tracing::debug!(?config, "parsed dashboard config");
        Ok(config)
    }
}
