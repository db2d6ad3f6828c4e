use std::{fmt, str::FromStr};

use anyhow::{anyhow, ensure};
use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// A lon/lat bounding box in canonical (EPSG:4326) degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// The Bellevue sub-area used for the dashboard homepage.
    pub const BELLEVUE: BoundingBox = BoundingBox::new(-122.24, 47.56, -122.10, 47.65);

    /// True if all edges are finite and the box is not inverted. Zero-area boxes are allowed.
    pub fn is_well_formed(&self) -> bool {
        [self.west, self.south, self.east, self.north].iter().all(|v| v.is_finite())
            && self.west <= self.east
            && self.south <= self.north
    }

    /// Convert to a `geo::Rect`.
    #[inline]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord { x: self.west, y: self.south },
            Coord { x: self.east, y: self.north },
        )
    }

    /// Check whether a point lies inside the box, edges included.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.west, self.south, self.east, self.north)
    }
}

/// Parses `west,south,east,north`.
impl FromStr for BoundingBox {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(',')
            .map(|part| part.trim().parse::<f64>()
                .map_err(|e| anyhow!("invalid bounding box component {part:?}: {e}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        ensure!(parts.len() == 4, "bounding box must be west,south,east,north (got {} values)", parts.len());

        let bbox = BoundingBox::new(parts[0], parts[1], parts[2], parts[3]);
        ensure!(bbox.is_well_formed(), "bounding box {bbox} is inverted or not finite");
        Ok(bbox)
    }
}
