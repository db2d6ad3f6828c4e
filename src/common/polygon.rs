use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{self as shp, Shape};

/// Convert a polygon-family shape into a 2D geo::MultiPolygon<f64>.
/// Returns `None` for `NullShape` and for non-polygon shapes.
pub(crate) fn shape_to_multipolygon(shape: &Shape) -> Option<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        _ => None,
    }
}

/// Group shapefile rings into polygons: each outer ring owns the inner rings that follow it.
fn rings_to_geo<P>(rings: &[shp::PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let mut coords = ring.points().iter().map(&xy).collect::<Vec<_>>();
        ensure_closed(&mut coords);
        let ls = LineString(coords);

        match ring {
            shp::PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ls);
            }
            // A hole with no preceding outer ring is kept so validation can reject the shape.
            shp::PolygonRing::Inner(_) => match current_exterior {
                Some(_) => current_holes.push(ls),
                None => polys.push(Polygon::new(ls, vec![])),
            },
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}
