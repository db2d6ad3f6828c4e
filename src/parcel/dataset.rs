use std::sync::Arc;

use ahash::AHashMap;
use geo::{MultiPolygon, Point};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{geom::{BoundingBox, Geometries}, io};
use super::schema::{AssessmentField, Attributes};

/// One assessment record joined with its (cleaned, EPSG:4326) parcel polygon.
/// The polygon lives in the owning [`MergedDataset`] at the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedParcel {
    pin: Arc<str>,
    attributes: Attributes,
}

impl EnrichedParcel {
    pub(crate) fn new(pin: Arc<str>, attributes: Attributes) -> Self {
        Self { pin, attributes }
    }

    #[inline] pub fn pin(&self) -> &str { &self.pin }

    #[inline] pub fn attributes(&self) -> &Attributes { &self.attributes }

    /// GeoJSON properties: `PIN` followed by the present schema fields.
    pub(crate) fn properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("PIN".to_string(), Value::String(self.pin.to_string()));
        self.attributes.write_json(&mut properties);
        properties
    }
}

/// Counters and facts recorded while building a [`MergedDataset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadStats {
    /// Name of the parcel CRS from the `.prj` sidecar.
    pub source_crs: String,
    /// Whether parcel coordinates were transformed to EPSG:4326.
    pub reprojected: bool,
    pub parcel_records: usize,
    pub assessment_records: usize,
    /// Rows after the left join (before geometry cleaning).
    pub joined_rows: usize,
    /// Rows dropped for missing or invalid geometry.
    pub removed_rows: usize,
    /// Source columns outside the declared schema.
    pub dropped_columns: Vec<String>,
    /// Declared schema columns the source does not provide.
    pub missing_columns: Vec<String>,
    pub elapsed_ms: u64,
}

/// The cleaned join result that queries run against.
#[derive(Debug, Clone, Default)]
pub struct MergedDataset {
    parcels: Vec<EnrichedParcel>,
    geoms: Geometries,
    pin_index: AHashMap<Arc<str>, usize>, // First row for each PIN.
    columns: Vec<AssessmentField>,
    stats: LoadStats,
}

impl MergedDataset {
    /// Build from cleaned rows in their final (stable) order.
    pub(crate) fn new(rows: Vec<(EnrichedParcel, MultiPolygon<f64>)>, columns: Vec<AssessmentField>, stats: LoadStats) -> Self {
        let (parcels, shapes): (Vec<_>, Vec<_>) = rows.into_iter().unzip();

        let mut pin_index = AHashMap::with_capacity(parcels.len());
        for (i, parcel) in parcels.iter().enumerate() {
            pin_index.entry(parcel.pin.clone()).or_insert(i);
        }

        Self { parcels, geoms: Geometries::new(shapes), pin_index, columns, stats }
    }

    /// Number of parcels.
    #[inline] pub fn len(&self) -> usize { self.parcels.len() }

    /// Check if there are no parcels.
    #[inline] pub fn is_empty(&self) -> bool { self.parcels.is_empty() }

    #[inline] pub fn parcels(&self) -> &[EnrichedParcel] { &self.parcels }

    /// Polygon of the parcel at `idx`.
    #[inline] pub fn geometry(&self, idx: usize) -> Option<&MultiPolygon<f64>> { self.geoms.get(idx) }

    /// Schema fields provided by the assessment source.
    #[inline] pub fn columns(&self) -> &[AssessmentField] { &self.columns }

    #[inline] pub fn stats(&self) -> &LoadStats { &self.stats }

    /// Iterate parcels together with their polygons.
    pub fn iter(&self) -> impl Iterator<Item = (&EnrichedParcel, &MultiPolygon<f64>)> {
        self.parcels.iter().enumerate()
            .filter_map(|(i, parcel)| self.geoms.get(i).map(|shape| (parcel, shape)))
    }

    /// Index of the first parcel with exactly this PIN.
    #[inline]
    pub fn find(&self, pin: &str) -> Option<usize> {
        self.pin_index.get(pin).copied()
    }

    /// Indices (dataset order) of parcels whose polygon intersects `bounds`.
    #[inline]
    pub fn intersecting(&self, bounds: &BoundingBox) -> Vec<usize> {
        self.geoms.intersecting(bounds)
    }

    /// Centroid (x = longitude, y = latitude) of the parcel at `idx`.
    #[inline]
    pub fn centroid(&self, idx: usize) -> Option<Point<f64>> {
        self.geoms.centroid(idx)
    }

    /// Overall lon/lat extent of all parcels.
    pub fn extent(&self) -> Option<BoundingBox> {
        self.geoms.bounds()
            .map(|rect| BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// GeoJSON FeatureCollection of the parcels at `indices`.
    pub fn to_feature_collection(&self, indices: impl IntoIterator<Item = usize>) -> Value {
        let features = indices.into_iter()
            .filter_map(|idx| Some((self.parcels.get(idx)?, self.geoms.get(idx)?)))
            .map(|(parcel, shape)| io::geojson::feature(parcel.pin(), shape, parcel.properties()))
            .collect();
        io::geojson::feature_collection(features)
    }
}
