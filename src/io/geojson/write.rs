use geo::{LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

/// Wrap features in a GeoJSON FeatureCollection.
pub(crate) fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Build one GeoJSON Feature.
pub(crate) fn feature(id: &str, geometry: &MultiPolygon<f64>, properties: Map<String, Value>) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "geometry": multipolygon_to_geojson(geometry),
        "properties": properties,
    })
}

/// Convert a MultiPolygon to a GeoJSON geometry; single-part shapes become a `Polygon`.
pub(crate) fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    match mp.0.as_slice() {
        [polygon] => json!({
            "type": "Polygon",
            "coordinates": polygon_coords(polygon),
        }),
        polygons => json!({
            "type": "MultiPolygon",
            "coordinates": polygons.iter().map(polygon_coords).collect::<Vec<_>>(),
        }),
    }
}

/// `[exterior, hole, hole, ...]`
fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_coords)
        .collect()
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}
