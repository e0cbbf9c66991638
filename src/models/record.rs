use std::fmt::{Display, Formatter};

use serde::Deserialize;
use serde_json::Value;

use crate::models::PropertyType;

/// Reference dataset row as delivered by the dataset endpoint.
///
/// Numeric columns may arrive either as JSON numbers or as strings, so they are kept untyped
/// until [`PropertyRecord::coerce`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Type", default)]
    pub property_type: Value,

    #[serde(rename = "Rooms", default)]
    pub rooms: Value,

    #[serde(rename = "Distance", default)]
    pub distance: Value,

    #[serde(rename = "Price", default)]
    pub price: Value,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordField {
    Type,
    Rooms,
    Distance,
    Price,
}

impl Display for RecordField {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Type => "Type",
            Self::Rooms => "Rooms",
            Self::Distance => "Distance",
            Self::Price => "Price",
        })
    }
}

/// Malformed field of an individual row. Never fatal: the field is left out of every
/// aggregate it would contribute to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("row #{row}: `{field}` is not usable: {value}")]
pub struct AggregationDataError {
    pub row: usize,
    pub field: RecordField,
    pub value: Value,
}

/// Coerced reference row. A field is `None` when its raw value could not be coerced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PropertyRecord {
    pub property_type: Option<PropertyType>,
    pub rooms: Option<u32>,
    pub distance_km: Option<f64>,
    pub price: Option<f64>,
}

impl PropertyRecord {
    /// Coerces the raw row, reporting every field that had to be dropped.
    pub fn coerce(row: usize, raw: RawRecord) -> (Self, Vec<AggregationDataError>) {
        let mut errors = Vec::new();
        let record = Self {
            property_type: report(
                &mut errors,
                row,
                RecordField::Type,
                &raw.property_type,
                raw.property_type.as_str().and_then(|code| code.trim().parse().ok()),
            ),
            rooms: report(
                &mut errors,
                row,
                RecordField::Rooms,
                &raw.rooms,
                to_f64(&raw.rooms).and_then(to_count),
            ),
            distance_km: report(
                &mut errors,
                row,
                RecordField::Distance,
                &raw.distance,
                to_f64(&raw.distance).filter(|distance| *distance >= 0.0),
            ),
            price: report(&mut errors, row, RecordField::Price, &raw.price, to_f64(&raw.price)),
        };
        (record, errors)
    }
}

fn report<T>(
    errors: &mut Vec<AggregationDataError>,
    row: usize,
    field: RecordField,
    value: &Value,
    coerced: Option<T>,
) -> Option<T> {
    if coerced.is_none() {
        errors.push(AggregationDataError {
            row,
            field,
            value: value.clone(),
        });
    }
    coerced
}

/// Accepts JSON numbers and numeric strings, rejects anything non-finite.
fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(string) => string.trim().parse().ok(),
        _ => None,
    }
    .filter(|value: &f64| value.is_finite())
}

fn to_count(value: f64) -> Option<u32> {
    (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then(|| value as u32)
}
