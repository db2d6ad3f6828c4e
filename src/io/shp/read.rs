use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use shapefile::{dbase::{self, FieldValue}, Reader, ShapeType};

use crate::common;

/// Parcel shapes and their join keys, index-aligned, in file order.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParcelShapes {
    /// Attribute-table columns, from the `.dbf` header.
    pub(crate) fields: Vec<String>,
    /// Join key per record, coerced to a string; `None` if null or absent.
    pub(crate) pins: Vec<Option<String>>,
    /// Polygon per record; `None` for null or non-polygon shapes.
    pub(crate) shapes: Vec<Option<MultiPolygon<f64>>>,
}

impl ParcelShapes {
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// True if the attribute table declares `column`, whether or not it has records.
    pub(crate) fn has_field(&self, column: &str) -> bool {
        self.fields.iter().any(|field| field == column)
    }
}

/// Reads all shapes + the `pin_column` attribute from a given `.shp` file path.
pub(crate) fn read_parcel_shapes(path: &Path, pin_column: &str) -> Result<ParcelShapes> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp::read] Failed to open shapefile: {}", path.display()))?;

    let size = reader.shape_count()
        .with_context(|| format!("[io::shp::read] Failed to read shape index: {}", path.display()))?;

    let mut parcels = ParcelShapes {
        fields: read_field_names(path)?,
        pins: Vec::with_capacity(size),
        shapes: Vec::with_capacity(size),
    };
    let mut skipped = 0usize;

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("[io::shp::read] Error reading shape+record")?;

        let geometry = common::shape_to_multipolygon(&shape);
        if geometry.is_none() && shape.shapetype() != ShapeType::NullShape {
            skipped += 1;
            tracing::debug!(shape_type = ?shape.shapetype(), "non-polygon shape in parcel layer");
        }

        parcels.pins.push(record.get(pin_column).and_then(pin_from_field));
        parcels.shapes.push(geometry);
    }

    if skipped > 0 {
        tracing::warn!(skipped, path = %path.display(), "non-polygon shapes treated as missing geometry");
    }
    Ok(parcels)
}

/// Column names declared in the `.dbf` header next to `path`.
fn read_field_names(path: &Path) -> Result<Vec<String>> {
    let dbf = path.with_extension("dbf");
    let table = dbase::Reader::from_path(&dbf)
        .with_context(|| format!("[io::shp::read] Failed to read attribute table header: {}", dbf.display()))?;
    Ok(table.fields().iter().map(|field| field.name().to_string()).collect())
}

/// Coerce a dBase join-key value to its string form.
/// Integral numbers print without a fractional part so `123.0` joins against `"123"`.
pub(crate) fn pin_from_field(value: &FieldValue) -> Option<String> {
    fn text(s: &str) -> Option<String> {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    }

    fn number(n: f64) -> Option<String> {
        if !n.is_finite() {
            None
        } else if n.fract() == 0.0 && n.abs() < 1e15 {
            Some(format!("{}", n as i64))
        } else {
            Some(n.to_string())
        }
    }

    match value {
        FieldValue::Character(Some(s)) => text(s),
        FieldValue::Memo(s) => text(s),
        FieldValue::Numeric(Some(n)) => number(*n),
        FieldValue::Float(Some(f)) => number(*f as f64),
        FieldValue::Double(d) => number(*d),
        FieldValue::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use shapefile::dbase::FieldValue;

    use super::pin_from_field;

    #[test]
    fn character_pins_are_trimmed() {
        assert_eq!(pin_from_field(&FieldValue::Character(Some(" 0123 ".into()))), Some("0123".into()));
        assert_eq!(pin_from_field(&FieldValue::Character(Some("   ".into()))), None);
        assert_eq!(pin_from_field(&FieldValue::Character(None)), None);
    }

    #[test]
    fn numeric_pins_drop_integral_fraction() {
        assert_eq!(pin_from_field(&FieldValue::Numeric(Some(9_876_543_210.0))), Some("9876543210".into()));
        assert_eq!(pin_from_field(&FieldValue::Numeric(Some(12.5))), Some("12.5".into()));
        assert_eq!(pin_from_field(&FieldValue::Integer(77)), Some("77".into()));
        assert_eq!(pin_from_field(&FieldValue::Numeric(None)), None);
        assert_eq!(pin_from_field(&FieldValue::Logical(Some(true))), None);
    }
}
