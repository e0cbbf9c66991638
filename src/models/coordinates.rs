use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Default for Coordinates {
    /// Melbourne CBD.
    fn default() -> Self {
        Self {
            lat: -37.8136,
            lng: 144.9631,
        }
    }
}
