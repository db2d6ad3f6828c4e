use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    cache::{DatasetCache, DatasetSource},
    geom::BoundingBox,
    parcel::MergedDataset,
};

/// A GeoJSON `FeatureCollection` of parcels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureCollection(Value);

impl FeatureCollection {
    /// `{"type": "FeatureCollection", "features": []}`
    pub fn empty() -> Self {
        Self(json!({ "type": "FeatureCollection", "features": [] }))
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.0["features"].as_array().map_or(0, Vec::len)
    }

    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[inline] pub fn as_value(&self) -> &Value { &self.0 }

    #[inline] pub fn into_value(self) -> Value { self.0 }

    /// PINs of the features, in order.
    pub fn pins(&self) -> Vec<&str> {
        self.0["features"].as_array()
            .map(|features| features.iter().filter_map(|f| f["id"].as_str()).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for FeatureCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parcels intersecting `bounds` (all parcels if `None`) as GeoJSON.
///
/// Never fails: a failed load, an empty dataset, a malformed box or an empty intersection
/// all produce [`FeatureCollection::empty`].
pub fn spatial_subset<S: DatasetSource>(cache: &DatasetCache<S>, bounds: Option<&BoundingBox>) -> FeatureCollection {
    match cache.get_or_load(false) {
        Ok(dataset) => subset_of(&dataset, bounds),
        Err(e) => {
            warn!(error = %e, "parcel data unavailable, returning empty collection");
            FeatureCollection::empty()
        }
    }
}

/// [`spatial_subset`] over an already loaded dataset.
pub fn subset_of(dataset: &MergedDataset, bounds: Option<&BoundingBox>) -> FeatureCollection {
    if dataset.is_empty() {
        debug!("dataset is empty, returning empty collection");
        return FeatureCollection::empty();
    }

    let indices = match bounds {
        None => (0..dataset.len()).collect::<Vec<_>>(),
        Some(bounds) if !bounds.is_well_formed() => {
            warn!(%bounds, "malformed bounding box, returning empty collection");
            return FeatureCollection::empty();
        }
        Some(bounds) => {
            let hits = dataset.intersecting(bounds);
            info!(%bounds, total = dataset.len(), found = hits.len(), "filtered parcels to bounds");
            hits
        }
    };

    if indices.is_empty() {
        return FeatureCollection::empty();
    }
    FeatureCollection(dataset.to_feature_collection(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_matches_wire_format() {
        let empty = FeatureCollection::empty();
        assert!(empty.is_empty());
        assert_eq!(
            serde_json::from_str::<Value>(&empty.to_string()).unwrap(),
            json!({"type": "FeatureCollection", "features": []}),
        );
    }

    #[test]
    fn empty_dataset_yields_empty_collection() {
        let dataset = MergedDataset::default();
        assert!(subset_of(&dataset, None).is_empty());
        assert!(subset_of(&dataset, Some(&BoundingBox::BELLEVUE)).is_empty());
    }
}
