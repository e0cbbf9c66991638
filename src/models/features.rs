use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::models::PropertyType;

/// Validated description of the property being estimated.
///
/// Only [`crate::validation`] constructs it, so every instance satisfies the input ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    rooms: u8,

    #[serde(rename = "type")]
    property_type: PropertyType,

    postcode: Postcode,
    distance_km: f64,
}

impl FeatureVector {
    pub const ROOMS: std::ops::RangeInclusive<u8> = 1..=7;
    pub const DISTANCE_KM: std::ops::RangeInclusive<f64> = 1.0..=50.0;

    pub(crate) const fn new(
        rooms: u8,
        property_type: PropertyType,
        postcode: Postcode,
        distance_km: f64,
    ) -> Self {
        Self {
            rooms,
            property_type,
            postcode,
            distance_km,
        }
    }

    pub const fn rooms(&self) -> u8 {
        self.rooms
    }

    pub const fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub const fn postcode(&self) -> &Postcode {
        &self.postcode
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

/// Four ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Postcode(String);

impl Postcode {
    pub const N_DIGITS: usize = 4;

    pub(crate) fn parse(value: &str) -> Option<Self> {
        (value.len() == Self::N_DIGITS && value.bytes().all(|byte| byte.is_ascii_digit()))
            .then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form expected by the prediction endpoint, leading zeros are dropped.
    pub fn as_number(&self) -> u16 {
        self.0
            .bytes()
            .fold(0, |number, digit| number * 10 + u16::from(digit - b'0'))
    }
}

impl Display for Postcode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}
