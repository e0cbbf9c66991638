//! Local validation of the submitted form, runs before any remote call.

use std::fmt::{Display, Formatter};

use crate::models::{FeatureVector, Postcode, PropertyType};

/// Raw form input, exactly as the user typed it.
#[derive(Debug, Clone, Default)]
pub struct RawFeatures {
    pub rooms: String,
    pub property_type: String,
    pub postcode: String,
    pub distance_km: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    Rooms,
    Type,
    Postcode,
    Distance,
}

impl Display for Field {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Rooms => "rooms",
            Self::Type => "type",
            Self::Postcode => "postcode",
            Self::Distance => "distance",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Reason {
    #[error("the value is missing")]
    Missing,

    #[error("expected an integer")]
    NotAnInteger,

    #[error("expected a number")]
    NotANumber,

    #[error("expected a value between {min} and {max}")]
    OutOfRange { min: String, max: String },

    #[error("expected one of `h` (house), `t` (townhouse) or `u` (unit)")]
    UnknownType,

    #[error("postcode must be exactly 4 digits")]
    NotFourDigits,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    const fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

impl TryFrom<&RawFeatures> for FeatureVector {
    type Error = ValidationError;

    fn try_from(raw: &RawFeatures) -> Result<Self, Self::Error> {
        Ok(Self::new(
            parse_rooms(&raw.rooms)?,
            parse_type(&raw.property_type)?,
            parse_postcode(&raw.postcode)?,
            parse_distance(&raw.distance_km)?,
        ))
    }
}

/// Validates the raw input into a feature vector.
pub fn validate(raw: &RawFeatures) -> Result<FeatureVector, ValidationError> {
    FeatureVector::try_from(raw)
}

fn non_empty(field: Field, value: &str) -> Result<&str, ValidationError> {
    match value.trim() {
        "" => Err(ValidationError::new(field, Reason::Missing)),
        value => Ok(value),
    }
}

fn parse_rooms(value: &str) -> Result<u8, ValidationError> {
    let value = non_empty(Field::Rooms, value)?;
    let range = FeatureVector::ROOMS;
    let out_of_range = || {
        ValidationError::new(
            Field::Rooms,
            Reason::OutOfRange {
                min: range.start().to_string(),
                max: range.end().to_string(),
            },
        )
    };
    let rooms: i64 = match value.parse() {
        Ok(rooms) => rooms,
        // Too many digits for `i64` is still an integer.
        Err(_) if is_integer_literal(value) => return Err(out_of_range()),
        Err(_) => return Err(ValidationError::new(Field::Rooms, Reason::NotAnInteger)),
    };
    u8::try_from(rooms)
        .ok()
        .filter(|rooms| range.contains(rooms))
        .ok_or_else(out_of_range)
}

fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(&['+', '-'][..]).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_type(value: &str) -> Result<PropertyType, ValidationError> {
    non_empty(Field::Type, value)?
        .parse()
        .map_err(|_| ValidationError::new(Field::Type, Reason::UnknownType))
}

fn parse_postcode(value: &str) -> Result<Postcode, ValidationError> {
    Postcode::parse(non_empty(Field::Postcode, value)?)
        .ok_or_else(|| ValidationError::new(Field::Postcode, Reason::NotFourDigits))
}

fn parse_distance(value: &str) -> Result<f64, ValidationError> {
    let distance: f64 = non_empty(Field::Distance, value)?
        .parse()
        .ok()
        .filter(|distance: &f64| distance.is_finite())
        .ok_or_else(|| ValidationError::new(Field::Distance, Reason::NotANumber))?;
    let range = FeatureVector::DISTANCE_KM;
    if range.contains(&distance) {
        Ok(distance)
    } else {
        Err(ValidationError::new(
            Field::Distance,
            Reason::OutOfRange {
                min: range.start().to_string(),
                max: range.end().to_string(),
            },
        ))
    }
}
