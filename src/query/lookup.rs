use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    cache::{DatasetCache, DatasetSource},
    error::LookupError,
    parcel::{AssessmentField, AttributeValue, Attributes, MergedDataset},
};

/// Everything known about one parcel, minus its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub pin: String,
    pub attributes: Attributes,
    /// Centroid latitude; `None` if the centroid could not be computed.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `ASSESSED_VALUE` as currency, present only when that value is known.
    pub assessed_value_formatted: Option<String>,
}

impl PropertyInfo {
    /// Flat JSON object: `PIN`, schema fields, `latitude`, `longitude` and, when known,
    /// `AssessedValueFormatted`.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("PIN".to_string(), Value::String(self.pin.clone()));
        self.attributes.write_json(&mut out);
        out.insert("latitude".to_string(), self.latitude.into());
        out.insert("longitude".to_string(), self.longitude.into());
        if let Some(formatted) = &self.assessed_value_formatted {
            out.insert("AssessedValueFormatted".to_string(), Value::String(formatted.clone()));
        }
        Value::Object(out)
    }
}

/// Look up one parcel by PIN, loading the dataset on first use.
pub fn lookup<S: DatasetSource>(cache: &DatasetCache<S>, pin: &str) -> Result<PropertyInfo, LookupError> {
    let dataset = cache.get_or_load(false).map_err(|e| {
        warn!(error = %e, pin, "lookup without data");
        LookupError::DataUnavailable
    })?;
    lookup_in(&dataset, pin)
}

/// [`lookup`] over an already loaded dataset. The PIN must match exactly; the first row
/// with it wins.
pub fn lookup_in(dataset: &MergedDataset, pin: &str) -> Result<PropertyInfo, LookupError> {
    if dataset.is_empty() {
        return Err(LookupError::DataEmpty { pin: pin.to_string() });
    }

    let idx = dataset.find(pin).ok_or_else(|| {
        debug!(pin, "PIN not in dataset");
        LookupError::PinNotFound { pin: pin.to_string() }
    })?;
    let parcel = &dataset.parcels()[idx];

    let centroid = dataset.centroid(idx);
    if centroid.is_none() {
        warn!(pin, "could not compute centroid");
    }

    let assessed_value_formatted = match parcel.attributes().get(AssessmentField::AssessedValue) {
        Some(AttributeValue::Known(raw)) => Some(format_currency(raw)),
        _ => None,
    };

    Ok(PropertyInfo {
        pin: parcel.pin().to_string(),
        attributes: parcel.attributes().clone(),
        latitude: centroid.map(|c| c.y()),
        longitude: centroid.map(|c| c.x()),
        assessed_value_formatted,
    })
}

/// `"$"` + the value rounded to whole units with thousands separators (`"-1234.5"` →
/// `"$-1,234"`). Text that is not a finite number is returned unchanged, so `"nan"` and
/// `"inf"` stay as they are instead of becoming `"$nan"` and `"$inf"`.
pub fn format_currency(raw: &str) -> String {
    let value = match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return raw.to_string(),
    };

    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", rounded.as_str()),
    };
    format!("${sign}{}", group_thousands(digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
