//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - assessment records (tabular, string-typed)
//! - `shp` - parcel polygons and their join keys
//! - `geojson` - FeatureCollection output for map rendering

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod shp;
