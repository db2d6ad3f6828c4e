use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Wire text for a value that is present in the schema but unknown for this parcel.
pub const NOT_AVAILABLE: &str = "N/A";

/// The declared assessment attribute schema. Anything else in the CSV is dropped at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssessmentField {
    Address,
    AssessedValue,
    BuildingValue,
    Acreage,
    UseCode,
    CityCode,
}

impl AssessmentField {
    /// Every field, in output order.
    pub const ALL: [AssessmentField; 6] = [
        AssessmentField::Address,
        AssessmentField::AssessedValue,
        AssessmentField::BuildingValue,
        AssessmentField::Acreage,
        AssessmentField::UseCode,
        AssessmentField::CityCode,
    ];

    /// Column name in the source CSV and in every output document.
    pub const fn column(self) -> &'static str {
        match self {
            AssessmentField::Address => "ADDRESS",
            AssessmentField::AssessedValue => "ASSESSED_VALUE",
            AssessmentField::BuildingValue => "BUILDING_VALUE",
            AssessmentField::Acreage => "ACREAGE",
            AssessmentField::UseCode => "USE_CODE",
            AssessmentField::CityCode => "CITY_CODE",
        }
    }

    /// Field for an exact column name, if it is part of the schema.
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == name)
    }
}

impl fmt::Display for AssessmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Value of one schema field for one parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Known(String),
    /// The column exists in the source but this row has no value.
    NotAvailable,
}

impl AttributeValue {
    /// Build from a raw cell; empty or whitespace-only cells are unknown.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell.map(str::trim) {
            Some(s) if !s.is_empty() => AttributeValue::Known(s.to_string()),
            _ => AttributeValue::NotAvailable,
        }
    }

    /// The known value, if any.
    pub fn known(&self) -> Option<&str> {
        match self {
            AttributeValue::Known(s) => Some(s),
            AttributeValue::NotAvailable => None,
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        self.known().unwrap_or(NOT_AVAILABLE)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Schema-projected attributes of one parcel. Only fields whose column exists in the
/// source are present; they are kept in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: Vec<(AssessmentField, AttributeValue)>,
}

impl Attributes {
    pub(crate) fn new(mut values: Vec<(AssessmentField, AttributeValue)>) -> Self {
        values.sort_by_key(|(field, _)| *field);
        values.dedup_by_key(|(field, _)| *field);
        Self { values }
    }

    /// `None` if the column is absent from the source; otherwise the (possibly unknown) value.
    pub fn get(&self, field: AssessmentField) -> Option<&AttributeValue> {
        self.values.iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssessmentField, &AttributeValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    #[inline] pub fn len(&self) -> usize { self.values.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Write every present field into a JSON object, `NotAvailable` as `"N/A"`.
    pub(crate) fn write_json(&self, out: &mut Map<String, Value>) {
        for (field, value) in self.iter() {
            out.insert(field.column().to_string(), Value::String(value.as_str().to_string()));
        }
    }
}

/// Outcome of matching the CSV header against the declared schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SchemaProjection {
    /// Schema fields present in the source, in schema order.
    pub(crate) present: Vec<AssessmentField>,
    /// Source columns that are neither the join key nor part of the schema.
    pub(crate) dropped: Vec<String>,
}

impl SchemaProjection {
    pub(crate) fn from_columns(columns: &[String], pin_column: &str) -> Self {
        let mut present = columns.iter()
            .filter_map(|column| AssessmentField::from_column(column))
            .collect::<Vec<_>>();
        present.sort();
        present.dedup();

        let dropped = columns.iter()
            .filter(|column| column.as_str() != pin_column && AssessmentField::from_column(column).is_none())
            .cloned()
            .collect();

        Self { present, dropped }
    }

    /// Schema fields the source does not provide.
    pub(crate) fn missing(&self) -> Vec<AssessmentField> {
        AssessmentField::ALL.into_iter()
            .filter(|field| !self.present.contains(field))
            .collect()
    }
}
