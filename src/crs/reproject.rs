use anyhow::{anyhow, ensure, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use super::ProjDef;

/// A compiled source → target coordinate transform.
pub(crate) struct Reprojector {
    from: Proj4,
    to: Proj4,
    from_def: ProjDef,
    to_def: ProjDef,
}

impl Reprojector {
    pub(crate) fn new(from_def: ProjDef, to_def: ProjDef) -> Result<Self> {
        let from = Proj4::from_proj_string(&from_def.proj4)
            .with_context(|| anyhow!("failed to build source PROJ.4: {}", from_def.proj4))?;
        let to = Proj4::from_proj_string(&to_def.proj4)
            .with_context(|| anyhow!("failed to build target PROJ.4: {}", to_def.proj4))?;
        Ok(Self { from, to, from_def, to_def })
    }

    /// Transform one coordinate. Geographic coordinates are degrees; projected ones are in the
    /// CRS's native linear unit.
    pub(crate) fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        // proj4rs takes radians for lon/lat and metres otherwise.
        let mut point = if self.from_def.geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x * self.from_def.to_meter, coord.y * self.from_def.to_meter, 0.0)
        };

        transform(&self.from, &self.to, &mut point)
            .with_context(|| format!("CRS transform failed at ({}, {})", coord.x, coord.y))?;

        let out = if self.to_def.geographic {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0 / self.to_def.to_meter, y: point.1 / self.to_def.to_meter }
        };
        ensure!(out.x.is_finite() && out.y.is_finite(),
            "CRS transform produced a non-finite coordinate at ({}, {})", coord.x, coord.y);
        Ok(out)
    }

    /// Transform every coordinate of a shape.
    pub(crate) fn transform(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord| self.transform_coord(coord))
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, Coord, CoordsIter, MultiPolygon};

    use super::Reprojector;
    use crate::crs::{ProjDef, SourceCrs};

    const WA_NORTH_FT: &str = r#"PROJCS["NAD_1983_HARN_StatePlane_Washington_North_FIPS_4601_Feet",GEOGCS["GCS_North_American_1983_HARN",DATUM["D_North_American_1983_HARN",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],PARAMETER["False_Easting",1640416.666666667],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-120.8333333333333],PARAMETER["Standard_Parallel_1",47.5],PARAMETER["Standard_Parallel_2",48.73333333333333],PARAMETER["Latitude_Of_Origin",47.0],UNIT["Foot_US",0.3048006096012192]]"#;

    fn state_plane() -> ProjDef {
        SourceCrs::from_wkt(WA_NORTH_FT).unwrap().to_proj_def().unwrap()
    }

    #[test]
    fn projection_origin_maps_to_false_easting() {
        let to_canonical = Reprojector::new(state_plane(), ProjDef::canonical()).unwrap();
        let c = to_canonical.transform_coord(Coord { x: 1640416.666666667, y: 0.0 }).unwrap();
        assert!((c.x - -120.8333333333333).abs() < 1e-6, "lon = {}", c.x);
        assert!((c.y - 47.0).abs() < 1e-6, "lat = {}", c.y);
    }

    #[test]
    fn round_trip_through_state_plane() {
        let shape = MultiPolygon(vec![polygon![
            (x: -122.20, y: 47.60),
            (x: -122.19, y: 47.60),
            (x: -122.19, y: 47.61),
            (x: -122.20, y: 47.61),
            (x: -122.20, y: 47.60),
        ]]);

        let to_source = Reprojector::new(ProjDef::canonical(), state_plane()).unwrap();
        let to_canonical = Reprojector::new(state_plane(), ProjDef::canonical()).unwrap();

        let projected = to_source.transform(&shape).unwrap();
        // Planar feet, nowhere near degree magnitudes.
        assert!(projected.coords_iter().all(|c| c.x.abs() > 1e5));

        let back = to_canonical.transform(&projected).unwrap();
        for (a, b) in shape.coords_iter().zip(back.coords_iter()) {
            assert!((a.x - b.x).abs() < 1e-8 && (a.y - b.y).abs() < 1e-8, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn utm_round_trip() {
        let utm = ProjDef {
            proj4: "+proj=utm +zone=10 +datum=WGS84 +units=m +no_defs".to_string(),
            geographic: false,
            to_meter: 1.0,
        };
        let forward = Reprojector::new(ProjDef::canonical(), utm.clone()).unwrap();
        let inverse = Reprojector::new(utm, ProjDef::canonical()).unwrap();

        let seattle = Coord { x: -122.3321, y: 47.6062 };
        let back = inverse.transform_coord(forward.transform_coord(seattle).unwrap()).unwrap();
        assert!((back.x - seattle.x).abs() < 1e-8 && (back.y - seattle.y).abs() < 1e-8);
    }

    #[test]
    fn bad_definition_is_rejected() {
        let bogus = ProjDef { proj4: "+proj=nonsense".to_string(), geographic: false, to_meter: 1.0 };
        assert!(Reprojector::new(bogus, ProjDef::canonical()).is_err());
    }
}
