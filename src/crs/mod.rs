mod reproject;
mod wkt;

use std::{fmt::Write as _, path::Path};

use anyhow::{anyhow, bail, Context, Result};

pub(crate) use reproject::Reprojector;

/// PROJ.4 definition of the canonical CRS (EPSG:4326, lon/lat degrees).
pub const CANONICAL_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// A PROJ.4 definition plus the facts the transform needs about it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProjDef {
    pub(crate) proj4: String,
    /// Lon/lat CRS (coordinates in degrees).
    pub(crate) geographic: bool,
    /// Metres per native linear unit (projected CRS only).
    pub(crate) to_meter: f64,
}

impl ProjDef {
    pub(crate) fn canonical() -> Self {
        Self { proj4: CANONICAL_PROJ4.to_string(), geographic: true, to_meter: 1.0 }
    }
}

/// Coordinate reference system of the parcel source, read from its `.prj` sidecar.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SourceCrs {
    name: String,
    kind: CrsKind,
}

#[derive(Debug, Clone, PartialEq)]
enum CrsKind {
    Geographic { datum: Datum, epsg: Option<u32> },
    Projected { datum: Datum, method: String, params: Vec<(String, f64)>, to_meter: f64 },
}

#[derive(Debug, Clone, PartialEq)]
enum Datum {
    Wgs84,
    Nad83,
    Ellipsoid { a: f64, rf: f64 },
}

impl Datum {
    fn from_geogcs(geogcs: &wkt::WktNode) -> Result<Self> {
        let datum = geogcs.child("DATUM").ok_or_else(|| anyhow!("GEOGCS has no DATUM"))?;
        let raw = datum.name().unwrap_or_default();
        let name = normalize(raw.strip_prefix("D_").unwrap_or(raw));

        if matches!(name.as_str(), "wgs1984" | "wgs84" | "worldgeodeticsystem1984") {
            return Ok(Datum::Wgs84);
        }
        if (name.starts_with("northamerican") && name.contains("1983")) || name.starts_with("nad83") {
            return Ok(Datum::Nad83);
        }

        let spheroid = datum.child("SPHEROID").or_else(|| datum.child("ELLIPSOID"))
            .ok_or_else(|| anyhow!("DATUM {name:?} has no SPHEROID"))?;
        match (spheroid.number(0), spheroid.number(1)) {
            (Some(a), Some(rf)) => Ok(Datum::Ellipsoid { a, rf }),
            _ => bail!("SPHEROID of DATUM {name:?} is missing its axis parameters"),
        }
    }

    fn proj4(&self) -> String {
        match self {
            Datum::Wgs84 => "+datum=WGS84".to_string(),
            Datum::Nad83 => "+ellps=GRS80 +towgs84=0,0,0".to_string(),
            Datum::Ellipsoid { a, rf } if *rf == 0.0 => format!("+a={a} +b={a}"),
            Datum::Ellipsoid { a, rf } => format!("+a={a} +rf={rf}"),
        }
    }
}

impl SourceCrs {
    /// Read and interpret the `.prj` sidecar at `path`.
    pub(crate) fn from_prj_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[crs::from_prj_file] Failed to read {}", path.display()))?;
        Self::from_wkt(&text)
    }

    /// Interpret WKT1 text. Fails if the text is not a CRS this reader understands.
    pub(crate) fn from_wkt(text: &str) -> Result<Self> {
        let root = wkt::parse(text)?;
        let name = root.name().unwrap_or_default().to_string();

        let kind = match root.keyword.as_str() {
            "GEOGCS" => CrsKind::Geographic { datum: Datum::from_geogcs(&root)?, epsg: root.epsg() },
            "PROJCS" => {
                let geogcs = root.child("GEOGCS").ok_or_else(|| anyhow!("PROJCS has no GEOGCS"))?;
                let method = root.child("PROJECTION")
                    .and_then(|node| node.name())
                    .ok_or_else(|| anyhow!("PROJCS has no PROJECTION"))?;
                let params = root.children("PARAMETER")
                    .map(|node| match (node.name(), node.number(0)) {
                        (Some(key), Some(value)) => Ok((normalize(key), value)),
                        _ => Err(anyhow!("malformed PARAMETER in PROJCS")),
                    })
                    .collect::<Result<Vec<_>>>()?;
                let to_meter = root.child("UNIT")
                    .and_then(|unit| unit.number(0))
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .ok_or_else(|| anyhow!("PROJCS has no valid linear UNIT"))?;

                CrsKind::Projected { datum: Datum::from_geogcs(geogcs)?, method: method.to_string(), params, to_meter }
            }
            other => bail!("unsupported CRS definition root {other:?}"),
        };

        Ok(Self { name, kind })
    }

    /// Human-readable CRS name from the sidecar.
    #[inline] pub(crate) fn name(&self) -> &str { &self.name }

    /// True if the CRS is already WGS84 lon/lat and no reprojection is needed.
    pub(crate) fn is_canonical(&self) -> bool {
        match &self.kind {
            CrsKind::Geographic { epsg: Some(code), .. } => *code == 4326,
            CrsKind::Geographic { datum, .. } => *datum == Datum::Wgs84,
            CrsKind::Projected { .. } => false,
        }
    }

    /// Express the CRS as a PROJ.4 definition for proj4rs.
    /// Fails for projection methods this crate does not map.
    pub(crate) fn to_proj_def(&self) -> Result<ProjDef> {
        match &self.kind {
            CrsKind::Geographic { datum, .. } => Ok(ProjDef {
                proj4: format!("+proj=longlat {} +no_defs", datum.proj4()),
                geographic: true,
                to_meter: 1.0,
            }),
            CrsKind::Projected { datum, method, params, to_meter } => {
                let normalized = normalize(method);
                let proj = match normalized.as_str() {
                    "lambertconformalconic" | "lambertconformalconic2sp" | "lambertconformalconic1sp" => "lcc",
                    "transversemercator" | "gausskruger" => "tmerc",
                    "mercator" | "mercator1sp" | "mercator2sp" => "merc",
                    "albers" | "albersconicequalarea" | "albersequalarea" => "aea",
                    _ => bail!("unsupported projection method {method:?} in {:?}", self.name),
                };

                let mut proj4 = format!("+proj={proj}");
                for (key, value) in params {
                    let (param, value) = match key.as_str() {
                        "falseeasting" => ("x_0", value * to_meter),
                        "falsenorthing" => ("y_0", value * to_meter),
                        "centralmeridian" | "longitudeofcenter" | "longitudeoforigin" | "longitudeofnaturalorigin" => ("lon_0", *value),
                        "latitudeoforigin" | "latitudeofcenter" | "latitudeofnaturalorigin" => ("lat_0", *value),
                        "standardparallel1" => ("lat_1", *value),
                        "standardparallel2" => ("lat_2", *value),
                        "scalefactor" | "scalefactoratnaturalorigin" => ("k_0", *value),
                        _ => {
                            tracing::debug!(parameter = %key, "ignoring unmapped projection parameter");
                            continue
                        }
                    };
                    let _ = write!(proj4, " +{param}={value}");
                }

                // Single-parallel LCC is tangent at the latitude of origin.
                if proj == "lcc" && !params.iter().any(|(key, _)| key == "standardparallel1") {
                    if let Some((_, lat_0)) = params.iter().find(|(key, _)| key.starts_with("latitudeof")) {
                        let _ = write!(proj4, " +lat_1={lat_0}");
                    }
                }

                let _ = write!(proj4, " {} +units=m +no_defs", datum.proj4());
                Ok(ProjDef { proj4, geographic: false, to_meter: *to_meter })
            }
        }
    }
}

/// Lowercase and drop everything that is not a letter or digit.
fn normalize(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).map(|c| c.to_ascii_lowercase()).collect()
}
