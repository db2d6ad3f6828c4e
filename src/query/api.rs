use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    cache::{DatasetCache, DatasetSource},
    config::ViewConfig,
};
use super::{lookup, spatial_subset};

/// Status code and JSON body for a request handled by the web layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[inline] pub fn is_success(&self) -> bool { self.status == 200 }
}

/// `GET /api/property_info/<pin>`: 200 with the flat property object, or 404 with
/// `{"error": <message>}` for every lookup failure.
pub fn property_info_response<S: DatasetSource>(cache: &DatasetCache<S>, pin: &str) -> ApiResponse {
    match lookup(cache, pin) {
        Ok(info) => ApiResponse { status: 200, body: info.to_json() },
        Err(e) => ApiResponse { status: 404, body: json!({ "error": e.to_string() }) },
    }
}

/// What the homepage template is rendered with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub title: String,
    pub map_center_lat: f64,
    pub map_center_lon: f64,
    pub map_zoom: u8,
    /// GeoJSON FeatureCollection of the default bounds, encoded as a string.
    pub parcels_geojson: String,
}

pub fn home_view<S: DatasetSource>(cache: &DatasetCache<S>, view: &ViewConfig) -> HomeView {
    let parcels = spatial_subset(cache, Some(&view.default_bounds));
    HomeView {
        title: view.title.clone(),
        map_center_lat: view.center_lat,
        map_center_lon: view.center_lon,
        map_zoom: view.zoom,
        parcels_geojson: parcels.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{error::LoadError, parcel::MergedDataset};

    fn broken() -> Result<MergedDataset, LoadError> {
        Err(LoadError::AttributeSourceMissing { path: PathBuf::from("gone.csv") })
    }

    #[test]
    fn lookup_without_data_is_404() {
        let cache = DatasetCache::new(broken);
        let response = property_info_response(&cache, "0123");
        assert_eq!(response.status, 404);
        assert_eq!(response.body, json!({ "error": "Data not loaded" }));
        assert!(!response.is_success());
    }

    #[test]
    fn home_view_falls_back_to_empty_collection() {
        let cache = DatasetCache::new(broken);
        let view = home_view(&cache, &ViewConfig::default());

        assert_eq!(view.title, "King County Real Estate Dashboard");
        assert_eq!(view.map_zoom, 9);
        assert_eq!(view.map_center_lat, 47.6062);
        let parcels: Value = serde_json::from_str(&view.parcels_geojson).unwrap();
        assert_eq!(parcels, json!({ "type": "FeatureCollection", "features": [] }));
    }
}
