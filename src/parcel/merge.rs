use std::{path::Path, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use geo::{MultiPolygon, Validation};
use polars::{df, frame::DataFrame, prelude::*};
use tracing::{debug, info, warn};

use crate::{
    common,
    config::SourceConfig,
    crs::{ProjDef, Reprojector, SourceCrs},
    error::{chain, JoinSide, LoadError},
    io::{self, shp::ParcelShapes},
};
use super::{
    dataset::{EnrichedParcel, LoadStats, MergedDataset},
    schema::{AssessmentField, AttributeValue, Attributes, SchemaProjection},
};

// Helper columns added for the join; the double underscore keeps them clear of CSV headers.
const ROW_IDX: &str = "__row_idx";
const GEOM_IDX: &str = "__geom_idx";
const GEOM_PIN: &str = "__geom_pin";

/// Build the merged parcel dataset from the configured sources.
///
/// Reads and reprojects the parcel shapefile, reads the assessment CSV, left-joins them on
/// the PIN column (assessment side anchored), drops rows without a valid polygon and
/// projects the attributes onto [`AssessmentField`]. Any failure aborts the whole load.
pub fn load_dataset(config: &SourceConfig) -> Result<MergedDataset, LoadError> {
    let started = Instant::now();
    let mut stats = LoadStats::default();

    // 1. Parcel polygons.
    let mut parcels = read_geometry_source(&config.parcels, &config.parcel_pin_column)?;
    stats.parcel_records = parcels.len();

    // 2-3. CRS + reprojection.
    let crs = determine_crs(&config.parcels)?;
    stats.source_crs = crs.name().to_string();
    stats.reprojected = reproject_to_canonical(&crs, &mut parcels.shapes)?;

    // 4. Join key on the geometry side.
    if !parcels.has_field(&config.parcel_pin_column) {
        return Err(LoadError::JoinKeyMissing {
            side: JoinSide::Geometry,
            column: config.parcel_pin_column.clone(),
            available: parcels.fields.clone(),
        });
    }

    // 5-6. Assessment table, key check and schema projection.
    let (assessments, projection) = read_attribute_source(&config.assessments, &config.assessment_pin_column)?;
    stats.assessment_records = assessments.height();
    stats.dropped_columns = projection.dropped.clone();
    stats.missing_columns = projection.missing().iter().map(|field| field.column().to_string()).collect();

    // 7. Left join.
    let joined = left_join(&assessments, &config.assessment_pin_column, &projection.present, &parcels)
        .map_err(|e| LoadError::Merge { reason: chain(&e) })?;
    stats.joined_rows = joined.len();
    debug!(rows = stats.joined_rows, "joined assessments with parcels");

    // 8. Clean, then 10-11. fill and project.
    let rows = clean_and_fill(joined, &projection.present, parcels.shapes, &mut stats);
    info!(removed = stats.removed_rows, kept = rows.len(), "dropped rows with missing or invalid geometry");

    // 9. An empty result is still a valid dataset.
    if rows.is_empty() {
        warn!("merged dataset is empty after cleaning");
    }

    stats.elapsed_ms = started.elapsed().as_millis() as u64;
    info!(parcels = rows.len(), elapsed_ms = stats.elapsed_ms, crs = %stats.source_crs, "parcel dataset loaded");
    Ok(MergedDataset::new(rows, projection.present, stats))
}

fn read_geometry_source(path: &Path, pin_column: &str) -> Result<ParcelShapes, LoadError> {
    if !common::is_file(path) {
        return Err(LoadError::GeometrySourceMissing { path: path.to_path_buf() });
    }

    info!(path = %path.display(), "reading parcel shapefile");
    let parcels = io::shp::read_parcel_shapes(path, pin_column)
        .map_err(|e| LoadError::GeometrySourceCorrupt { path: path.to_path_buf(), reason: chain(&e) })?;
    info!(records = parcels.len(), "read parcel shapes");
    Ok(parcels)
}

fn determine_crs(shp_path: &Path) -> Result<SourceCrs, LoadError> {
    let prj_path = common::prj_sidecar(shp_path);
    if !common::is_file(&prj_path) {
        return Err(LoadError::CrsUndetermined {
            path: prj_path,
            reason: "no .prj sidecar next to the shapefile".to_string(),
        });
    }

    let crs = SourceCrs::from_prj_file(&prj_path)
        .map_err(|e| LoadError::CrsUndetermined { path: prj_path.clone(), reason: chain(&e) })?;
    debug!(crs = crs.name(), "parcel CRS determined");
    Ok(crs)
}

/// Transform every shape into EPSG:4326 in place. Returns false if nothing had to be done.
fn reproject_to_canonical(crs: &SourceCrs, shapes: &mut [Option<MultiPolygon<f64>>]) -> Result<bool, LoadError> {
    if crs.is_canonical() {
        info!(crs = crs.name(), "parcels already in EPSG:4326, skipping reprojection");
        return Ok(false);
    }

    let failed = |e: anyhow::Error| LoadError::ReprojectionFailed { reason: chain(&e) };
    let def = crs.to_proj_def().map_err(failed)?;
    debug!(proj4 = %def.proj4, "reprojecting parcels");
    let reprojector = Reprojector::new(def, ProjDef::canonical()).map_err(failed)?;

    for shape in shapes.iter_mut().flatten() {
        *shape = reprojector.transform(shape).map_err(failed)?;
    }
    info!(crs = crs.name(), "reprojected parcels to EPSG:4326");
    Ok(true)
}

fn read_attribute_source(path: &Path, pin_column: &str) -> Result<(DataFrame, SchemaProjection), LoadError> {
    if !common::is_file(path) {
        return Err(LoadError::AttributeSourceMissing { path: path.to_path_buf() });
    }

    info!(path = %path.display(), "reading assessment records");
    let mut df = io::csv::read_csv_as_strings(path)
        .map_err(|e| LoadError::AttributeSourceCorrupt { path: path.to_path_buf(), reason: chain(&e) })?;

    let columns = io::csv::column_names(&df);
    if !columns.iter().any(|column| column == pin_column) {
        return Err(LoadError::JoinKeyMissing {
            side: JoinSide::Attributes,
            column: pin_column.to_string(),
            available: columns,
        });
    }

    io::csv::trim_string_column(&mut df, pin_column)
        .map_err(|e| LoadError::AttributeSourceCorrupt { path: path.to_path_buf(), reason: chain(&e) })?;

    let projection = SchemaProjection::from_columns(&columns, pin_column);
    if !projection.dropped.is_empty() {
        debug!(columns = ?projection.dropped, "dropping assessment columns outside the schema");
    }
    let missing = projection.missing();
    if !missing.is_empty() {
        warn!(columns = ?missing, "schema columns absent from assessment records");
    }

    info!(records = df.height(), "read assessment records");
    Ok((df, projection))
}

/// One row of the join result, before cleaning.
struct JoinedRow {
    row: u32,
    geom: Option<u32>,
    pin: Option<String>,
    cells: Vec<Option<String>>,
}

/// Left-join the assessment rows (projected to `present`) against the parcel keys.
/// Rows come back in assessment order, ties broken by shapefile order.
fn left_join(assessments: &DataFrame, pin_column: &str, present: &[AssessmentField], parcels: &ParcelShapes) -> Result<Vec<JoinedRow>> {
    let selection = std::iter::once(pin_column)
        .chain(present.iter().map(|field| field.column()))
        .collect::<Vec<_>>();

    let parcel_keys = df![
        GEOM_PIN => parcels.pins.iter().map(|pin| pin.as_deref()).collect::<Vec<_>>(),
        GEOM_IDX => (0..parcels.len() as u32).collect::<Vec<_>>(),
    ].context("[parcel::merge::left_join] failed to build parcel key frame")?;

    let joined = assessments
        .select(selection)
        .context("[parcel::merge::left_join] failed to project assessment columns")?
        .with_row_index(ROW_IDX.into(), None)
        .context("[parcel::merge::left_join] failed to add row index")?
        .left_join(&parcel_keys, [pin_column], [GEOM_PIN])
        .with_context(|| format!("[parcel::merge::left_join] left_join on {pin_column:?} failed"))?;

    let row_idx = joined.column(ROW_IDX)?.cast(&DataType::UInt32)?;
    let row_idx = row_idx.u32()?;
    let geom_idx = joined.column(GEOM_IDX)?.cast(&DataType::UInt32)?;
    let geom_idx = geom_idx.u32()?;
    let pins = joined.column(pin_column)?.str()?;
    let cells = present.iter()
        .map(|field| -> Result<&StringChunked> { Ok(joined.column(field.column())?.str()?) })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(joined.height());
    for i in 0..joined.height() {
        rows.push(JoinedRow {
            row: row_idx.get(i).unwrap_or_default(),
            geom: geom_idx.get(i),
            pin: pins.get(i).map(str::to_string),
            cells: cells.iter().map(|column| column.get(i).map(str::to_string)).collect(),
        });
    }

    rows.sort_by_key(|row| (row.row, row.geom));
    Ok(rows)
}

/// Drop rows without a usable polygon, then build the enriched parcels.
fn clean_and_fill(
    joined: Vec<JoinedRow>,
    present: &[AssessmentField],
    shapes: Vec<Option<MultiPolygon<f64>>>,
    stats: &mut LoadStats,
) -> Vec<(EnrichedParcel, MultiPolygon<f64>)> {
    let usable = shapes.iter()
        .map(|shape| shape.as_ref().is_some_and(is_usable))
        .collect::<Vec<_>>();
    let invalid = shapes.iter().zip(&usable).filter(|(shape, ok)| shape.is_some() && !**ok).count();
    if invalid > 0 {
        debug!(invalid, "parcel polygons failed validation");
    }

    let mut rows = Vec::with_capacity(joined.len());
    let mut removed = 0usize;
    for row in joined {
        // Null keys never match, so such rows have no geometry either.
        let (Some(pin), Some(shape)) = (row.pin, row.geom.and_then(|idx| usable_shape(&shapes, &usable, idx))) else {
            removed += 1;
            continue;
        };

        let attributes = Attributes::new(
            present.iter().copied()
                .zip(row.cells.iter())
                .map(|(field, cell)| (field, AttributeValue::from_cell(cell.as_deref())))
                .collect(),
        );
        rows.push((EnrichedParcel::new(Arc::from(pin), attributes), shape));
    }

    stats.removed_rows = removed;
    rows
}

fn usable_shape(shapes: &[Option<MultiPolygon<f64>>], usable: &[bool], idx: u32) -> Option<MultiPolygon<f64>> {
    let idx = idx as usize;
    if !usable.get(idx).copied().unwrap_or(false) {
        return None;
    }
    shapes.get(idx).cloned().flatten()
}

/// Non-empty and valid per OGC rules (closed rings, no self-intersection).
fn is_usable(shape: &MultiPolygon<f64>) -> bool {
    !shape.0.is_empty() && shape.is_valid()
}
