// Shared fixtures: real shapefiles (.shp/.shx/.dbf + .prj) and assessment CSVs written
// into a temporary directory.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use parcelmap::SourceConfig;
use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, PointZ, Polygon, PolygonRing, PolygonZ,
};
use tempfile::TempDir;

pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

pub const STATE_PLANE_PRJ: &str = r#"PROJCS["NAD_1983_HARN_StatePlane_Washington_North_FIPS_4601_Feet",GEOGCS["GCS_North_American_1983_HARN",DATUM["D_North_American_1983_HARN",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],PARAMETER["False_Easting",1640416.666666667],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-120.8333333333333],PARAMETER["Standard_Parallel_1",47.5],PARAMETER["Standard_Parallel_2",48.73333333333333],PARAMETER["Latitude_Of_Origin",47.0],UNIT["Foot_US",0.3048006096012192]]"#;

/// Assessment rows used by [`Fixture::bellevue`]. `OWNER_NAME` is outside the schema;
/// `ACREAGE`, `USE_CODE` and `CITY_CODE` are absent.
pub const BELLEVUE_CSV: &str = "\
PIN,ADDRESS,ASSESSED_VALUE,BUILDING_VALUE,OWNER_NAME
0123,1 Main St,450000,200000,Alice
0456,2 Oak Ave,,150000,Bob
0789,3 Pine St,not assessed,,Carol
9999,4 Nowhere Rd,100000,1,Dan
BOWTIE,5 Twist Ln,1,1,Eve
";

/// Closed, clockwise (shapefile outer ring order) square with its south-west corner at (x, y).
pub fn square(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![(x, y), (x, y + size), (x + size, y + size), (x + size, y), (x, y)]
}

/// Self-intersecting ring; clockwise by signed area so it is read back as an outer ring.
pub fn bow_tie(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![(x, y), (x + 2.0 * size, y + 2.0 * size), (x + 2.0 * size, y), (x, y + size), (x, y)]
}

fn ring(points: &[(f64, f64)]) -> Polygon {
    Polygon::new(PolygonRing::Outer(points.iter().map(|&(x, y)| Point::new(x, y)).collect()))
}

/// Write a polygon shapefile with a single character PIN column.
pub fn write_shapefile(path: &Path, pin_field: &str, parcels: &[(&str, Vec<(f64, f64)>)]) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from(pin_field).unwrap(), 20);
    let mut writer = shapefile::Writer::from_path(path, table).unwrap();

    for (pin, points) in parcels {
        let mut record = Record::default();
        record.insert(pin_field.to_string(), FieldValue::Character(Some(pin.to_string())));
        writer.write_shape_and_record(&ring(points), &record).unwrap();
    }
}

/// Write a polygon shapefile whose PIN column is numeric.
pub fn write_numeric_pin_shapefile(path: &Path, parcels: &[(f64, Vec<(f64, f64)>)]) {
    let table = TableWriterBuilder::new()
        .add_numeric_field(FieldName::try_from("PIN").unwrap(), 18, 0);
    let mut writer = shapefile::Writer::from_path(path, table).unwrap();

    for (pin, points) in parcels {
        let mut record = Record::default();
        record.insert("PIN".to_string(), FieldValue::Numeric(Some(*pin)));
        writer.write_shape_and_record(&ring(points), &record).unwrap();
    }
}

/// Write a `PolygonZ` shapefile; every vertex gets elevation `z`.
pub fn write_polygon_z_shapefile(path: &Path, z: f64, parcels: &[(&str, Vec<(f64, f64)>)]) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("PIN").unwrap(), 20);
    let mut writer = shapefile::Writer::from_path(path, table).unwrap();

    for (pin, points) in parcels {
        let ring = PolygonRing::Outer(points.iter().map(|&(x, y)| PointZ::new(x, y, z, 0.0)).collect());
        let mut record = Record::default();
        record.insert("PIN".to_string(), FieldValue::Character(Some(pin.to_string())));
        writer.write_shape_and_record(&PolygonZ::new(ring), &record).unwrap();
    }
}

/// Write a point shapefile, one point per PIN.
pub fn write_point_shapefile(path: &Path, points: &[(&str, (f64, f64))]) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("PIN").unwrap(), 20);
    let mut writer = shapefile::Writer::from_path(path, table).unwrap();

    for &(pin, (x, y)) in points {
        let mut record = Record::default();
        record.insert("PIN".to_string(), FieldValue::Character(Some(pin.to_string())));
        writer.write_shape_and_record(&Point::new(x, y), &record).unwrap();
    }
}

pub fn write_prj(shp_path: &Path, wkt: &str) {
    std::fs::write(shp_path.with_extension("prj"), wkt).unwrap();
}

/// A temporary data directory plus the config pointing at it.
pub struct Fixture {
    pub dir: TempDir,
    pub config: SourceConfig,
}

impl Fixture {
    /// Empty directory; nothing is written yet.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = SourceConfig {
            parcels: dir.path().join("parcel.shp"),
            assessments: dir.path().join("kc_assessment_data.csv"),
            ..SourceConfig::default()
        };
        Self { dir, config }
    }

    /// Three valid parcels (two inside the Bellevue box, one in Seattle) and a bow-tie,
    /// in WGS84, joined with [`BELLEVUE_CSV`].
    pub fn bellevue() -> Self {
        let fixture = Self::empty();
        write_shapefile(&fixture.config.parcels, "PIN", &[
            ("0123", square(-122.200, 47.600, 0.001)),
            ("0456", square(-122.150, 47.620, 0.001)),
            ("0789", square(-122.330, 47.600, 0.001)),
            ("BOWTIE", bow_tie(-122.180, 47.580, 0.001)),
        ]);
        write_prj(&fixture.config.parcels, WGS84_PRJ);
        fixture.write_csv(BELLEVUE_CSV);
        fixture
    }

    pub fn write_csv(&self, content: &str) {
        std::fs::write(&self.config.assessments, content).unwrap();
    }

    pub fn prj_path(&self) -> PathBuf {
        self.config.parcels.with_extension("prj")
    }
}
