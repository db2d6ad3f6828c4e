// Integration tests for the query layer over the Bellevue fixture: bounding-box subsets,
// PIN lookups and the response shapes handed to a web layer.

mod common;

use common::*;
use parcelmap::{
    home_view, lookup, property_info_response, spatial_subset, BoundingBox, DatasetCache, LookupError, ViewConfig,
};
use serde_json::json;

fn cache() -> (Fixture, DatasetCache) {
    let fixture = Fixture::bellevue();
    let cache = DatasetCache::from_config(fixture.config.clone());
    (fixture, cache)
}

#[test]
fn lookup_formats_assessed_value_and_centroid() {
    let (_fixture, cache) = cache();
    let info = lookup(&cache, "0123").unwrap();

    assert_eq!(info.assessed_value_formatted.as_deref(), Some("$450,000"));
    let (lat, lon) = (info.latitude.unwrap(), info.longitude.unwrap());
    let parcel_bounds = BoundingBox::new(-122.200, 47.600, -122.199, 47.601);
    assert!(parcel_bounds.contains_point(lon, lat), "centroid = ({lon}, {lat})");

    let json = info.to_json();
    assert_eq!(json["PIN"], "0123");
    assert_eq!(json["ADDRESS"], "1 Main St");
    assert_eq!(json["BUILDING_VALUE"], "200000");
    assert!(json.get("OWNER_NAME").is_none());
}

#[test]
fn lookup_passes_unparseable_value_through() {
    let (_fixture, cache) = cache();
    let info = lookup(&cache, "0789").unwrap();
    assert_eq!(info.assessed_value_formatted.as_deref(), Some("not assessed"));
    assert_eq!(info.to_json()["BUILDING_VALUE"], "N/A");
}

#[test]
fn lookup_omits_formatted_value_for_unknown() {
    let (_fixture, cache) = cache();
    let info = lookup(&cache, "0456").unwrap();
    assert_eq!(info.assessed_value_formatted, None);
    assert_eq!(info.to_json()["ASSESSED_VALUE"], "N/A");
}

#[test]
fn dropped_rows_are_not_found() {
    let (_fixture, cache) = cache();
    assert_eq!(lookup(&cache, "9999").unwrap_err(), LookupError::PinNotFound { pin: "9999".into() });
    assert_eq!(lookup(&cache, "BOWTIE").unwrap_err(), LookupError::PinNotFound { pin: "BOWTIE".into() });
    assert!(matches!(lookup(&cache, "123"), Err(LookupError::PinNotFound { .. })));
    assert_eq!(lookup(&cache, " 0123 ").unwrap_err(), LookupError::PinNotFound { pin: " 0123 ".into() });
}

#[test]
fn lookup_on_failed_load_is_data_unavailable() {
    let fixture = Fixture::empty();
    let cache = DatasetCache::from_config(fixture.config.clone());
    assert_eq!(lookup(&cache, "0123").unwrap_err(), LookupError::DataUnavailable);
}

#[test]
fn lookup_on_empty_dataset_is_data_empty() {
    let fixture = Fixture::bellevue();
    fixture.write_csv("PIN,ADDRESS\n9999,nowhere\n");
    let cache = DatasetCache::from_config(fixture.config.clone());
    assert_eq!(lookup(&cache, "0123").unwrap_err(), LookupError::DataEmpty { pin: "0123".into() });
}

#[test]
fn subset_keeps_only_intersecting_parcels() {
    let (_fixture, cache) = cache();

    let bellevue = spatial_subset(&cache, Some(&BoundingBox::BELLEVUE));
    assert_eq!(bellevue.pins(), vec!["0123", "0456"]);

    let everything = spatial_subset(&cache, None);
    assert_eq!(everything.pins(), vec!["0123", "0456", "0789"]);

    let feature = &everything.as_value()["features"][0];
    assert_eq!(feature["type"], "Feature");
    assert_eq!(feature["geometry"]["type"], "Polygon");
    assert_eq!(feature["properties"]["ASSESSED_VALUE"], "450000");
}

#[test]
fn subset_counts_boundary_contact_as_intersection() {
    let (_fixture, cache) = cache();
    // West edge of parcel 0123 sits exactly at -122.2.
    let touching = BoundingBox::new(-122.210, 47.600, -122.200, 47.610);
    assert_eq!(spatial_subset(&cache, Some(&touching)).pins(), vec!["0123"]);
}

#[test]
fn empty_region_and_bad_boxes_yield_empty_collection() {
    let (_fixture, cache) = cache();
    let empty = json!({ "type": "FeatureCollection", "features": [] });

    let nowhere = BoundingBox::new(-100.0, 10.0, -99.0, 11.0);
    assert_eq!(spatial_subset(&cache, Some(&nowhere)).as_value(), &empty);

    let inverted = BoundingBox::new(-122.10, 47.56, -122.24, 47.65);
    assert_eq!(spatial_subset(&cache, Some(&inverted)).as_value(), &empty);
}

#[test]
fn subset_on_failed_load_is_empty() {
    let fixture = Fixture::empty();
    let cache = DatasetCache::from_config(fixture.config.clone());
    assert!(spatial_subset(&cache, None).is_empty());
}

#[test]
fn property_info_response_status_codes() {
    let (_fixture, cache) = cache();

    let ok = property_info_response(&cache, "0123");
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body["AssessedValueFormatted"], "$450,000");

    let missing = property_info_response(&cache, "9999");
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body, json!({ "error": "PIN 9999 not found" }));
}

#[test]
fn home_view_embeds_bellevue_parcels() {
    let (_fixture, cache) = cache();
    let view = home_view(&cache, &ViewConfig::default());

    assert_eq!(view.map_center_lon, -122.3321);
    let parcels: serde_json::Value = serde_json::from_str(&view.parcels_geojson).unwrap();
    assert_eq!(parcels["features"].as_array().unwrap().len(), 2);
}
