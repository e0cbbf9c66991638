//! Grouped mean prices over the reference dataset.

use std::collections::BTreeMap;

use serde::Serialize;

pub use self::distance::DistanceBin;
pub use self::series::{AggregateSeries, SeriesPoint};
use crate::helpers::average::Average;
use crate::models::{PropertyRecord, PropertyType};
use crate::prelude::*;

mod distance;
mod series;

/// The three base series, rebuilt from scratch for every dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub by_type: AggregateSeries<PropertyType>,
    pub by_rooms: AggregateSeries<u32>,
    pub by_distance: AggregateSeries<DistanceBin>,
}

impl Aggregates {
    #[instrument(level = "debug", skip_all, fields(n_records = records.len()))]
    pub fn compute(records: &[PropertyRecord]) -> Self {
        let aggregates = Self {
            by_type: by_type(records),
            by_rooms: by_rooms(records),
            by_distance: by_distance(records),
        };
        debug!(
            n_types = aggregates.by_type.points.len(),
            n_room_counts = aggregates.by_rooms.points.len(),
            "aggregated"
        );
        aggregates
    }
}

/// Mean price per property type in the fixed type order. Types with no priced records are
/// omitted.
pub fn by_type(records: &[PropertyRecord]) -> AggregateSeries<PropertyType> {
    PropertyType::ALL
        .into_iter()
        .filter_map(|property_type| {
            records
                .iter()
                .filter(|record| record.property_type == Some(property_type))
                .filter_map(|record| record.price)
                .collect::<Average>()
                .average()
                .map(|average| (property_type, average))
        })
        .collect()
}

/// Mean price per room count, ascending numerically.
pub fn by_rooms(records: &[PropertyRecord]) -> AggregateSeries<u32> {
    let mut groups = BTreeMap::<u32, Average>::new();
    for record in records {
        if let (Some(rooms), Some(price)) = (record.rooms, record.price) {
            groups.entry(rooms).or_default().push(price);
        }
    }
    groups
        .into_iter()
        .filter_map(|(rooms, average)| average.average().map(|average| (rooms, average)))
        .collect()
}

/// Mean price per distance bin. Every bin is present: an empty one reports `0.0`.
pub fn by_distance(records: &[PropertyRecord]) -> AggregateSeries<DistanceBin> {
    let mut groups = [Average::default(); DistanceBin::ALL.len()];
    for record in records {
        if let (Some(distance_km), Some(price)) = (record.distance_km, record.price) {
            if let Some(index) = DistanceBin::locate(distance_km) {
                groups[index].push(price);
            }
        }
    }
    DistanceBin::ALL
        .into_iter()
        .zip(groups)
        .map(|(bin, average)| (bin, average.average().unwrap_or(0.0)))
        .collect()
}
