use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Half-open distance interval `[min, max)` in kilometres.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DistanceBin {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

impl DistanceBin {
    /// Contiguous bins covering every non-negative distance, in chart order.
    pub const ALL: [DistanceBin; 5] = [
        Self::new("0-5 km", 0.0, 5.0),
        Self::new("5-10 km", 5.0, 10.0),
        Self::new("10-15 km", 10.0, 15.0),
        Self::new("15-20 km", 15.0, 20.0),
        Self::new("20+ km", 20.0, f64::INFINITY),
    ];

    const fn new(label: &'static str, min: f64, max: f64) -> Self {
        Self { label, min, max }
    }

    pub fn contains(&self, distance_km: f64) -> bool {
        self.min <= distance_km && distance_km < self.max
    }

    /// Index of the bin containing the distance.
    pub fn locate(distance_km: f64) -> Option<usize> {
        Self::ALL.iter().position(|bin| bin.contains(distance_km))
    }

    /// Same as [`DistanceBin::locate`] but falls back to the last bin for negative or NaN
    /// distances.
    pub fn locate_or_last(distance_km: f64) -> usize {
        Self::locate(distance_km).unwrap_or(Self::ALL.len() - 1)
    }
}

impl Display for DistanceBin {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.label)
    }
}
