mod bounds;
mod geom;

pub use bounds::BoundingBox;
pub(crate) use geom::Geometries;
