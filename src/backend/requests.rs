use serde::Serialize;

use crate::models::{FeatureVector, PropertyType};

#[derive(Serialize, Debug, PartialEq)]
pub struct PredictRequest {
    #[serde(rename = "Rooms")]
    pub rooms: u8,

    #[serde(rename = "Type")]
    pub property_type: PropertyType,

    #[serde(rename = "Postcode")]
    pub postcode: u16,

    #[serde(rename = "Distance")]
    pub distance: f64,
}

impl From<&FeatureVector> for PredictRequest {
    fn from(features: &FeatureVector) -> Self {
        Self {
            rooms: features.rooms(),
            property_type: features.property_type(),
            postcode: features.postcode().as_number(),
            distance: features.distance_km(),
        }
    }
}
