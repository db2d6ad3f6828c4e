use geo::{BoundingRect, Centroid, Coord, Intersects, MultiPolygon, Point, Rect};
use rstar::{
    primitives::{GeomWithData, Rectangle},
    RTree, AABB,
};

use super::BoundingBox;

/// Parcel envelope in the R-tree, tagged with the parcel's index in `shapes`.
type ParcelEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Geometries stores the cleaned parcel shapes (EPSG:4326) with an R-tree over their envelopes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<ParcelEnvelope>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| {
                        let rect = shape.bounding_rect()?;
                        Some(ParcelEnvelope::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), i))
                    })
                    .collect()
            ),
            shapes,
        }
    }

    /// Get the MultiPolygon at `idx`.
    #[inline] pub(crate) fn get(&self, idx: usize) -> Option<&MultiPolygon<f64>> { self.shapes.get(idx) }

    /// Indices (ascending) of shapes that intersect `bounds`, boundary contact included.
    pub(crate) fn intersecting(&self, bounds: &BoundingBox) -> Vec<usize> {
        let rect = bounds.to_rect();
        let envelope = AABB::from_corners([bounds.west, bounds.south], [bounds.east, bounds.north]);

        let mut indices = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .filter(|&idx| self.shapes[idx].intersects(&rect))
            .collect::<Vec<_>>();
        indices.sort_unstable();
        indices
    }

    /// Centroid of the shape at `idx`, if the shape exists and has one.
    #[inline]
    pub(crate) fn centroid(&self, idx: usize) -> Option<Point<f64>> {
        self.shapes.get(idx)?.centroid()
            .filter(|point| point.x().is_finite() && point.y().is_finite())
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|polygon| polygon.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}
