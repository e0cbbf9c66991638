//! Places the predicted price onto the aggregate series.

use serde::Serialize;

use crate::aggregation::{AggregateSeries, Aggregates, DistanceBin};
use crate::models::{FeatureVector, PropertyType};

pub const OVERLAY_LABEL: &str = "Your Predicted Price";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub label: &'static str,

    /// Layers are drawn in ascending order, so the highest index ends up on top.
    pub z_index: u8,
}

impl Layer {
    const fn base(label: &'static str) -> Self {
        Self { label, z_index: 0 }
    }

    const fn overlay() -> Self {
        Self {
            label: OVERLAY_LABEL,
            z_index: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint<K> {
    pub key: K,
    pub average: f64,

    /// The predicted price, set on at most one point of the chart.
    pub overlay: Option<f64>,
}

impl<K> ChartPoint<K> {
    pub const fn is_highlighted(&self) -> bool {
        self.overlay.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart<K> {
    pub title: &'static str,
    pub base: Layer,
    pub overlay: Layer,
    pub points: Vec<ChartPoint<K>>,
}

impl<K> Chart<K> {
    fn new(
        title: &'static str,
        base_label: &'static str,
        series: AggregateSeries<K>,
        highlighted: Option<(usize, f64)>,
    ) -> Self {
        let points = series
            .points
            .into_iter()
            .enumerate()
            .map(|(index, point)| ChartPoint {
                key: point.key,
                average: point.average,
                overlay: highlighted
                    .filter(|(highlighted, _)| *highlighted == index)
                    .map(|(_, predicted)| predicted),
            })
            .collect();
        Self {
            title,
            base: Layer::base(base_label),
            overlay: Layer::overlay(),
            points,
        }
    }

    pub fn highlighted(&self) -> Option<&ChartPoint<K>> {
        self.points.iter().find(|point| point.is_highlighted())
    }

    /// Layers in the order they are drawn: the base series first, the overlay last.
    pub fn layers(&self) -> [&Layer; 2] {
        let mut layers = [&self.base, &self.overlay];
        layers.sort_by_key(|layer| layer.z_index);
        layers
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub by_type: Chart<PropertyType>,
    pub by_rooms: Chart<u32>,
    pub by_distance: Chart<DistanceBin>,
}

impl Charts {
    /// Overlays the predicted price onto every series.
    pub fn merge(aggregates: Aggregates, features: &FeatureVector, predicted: f64) -> Self {
        Self {
            by_type: merge_type(aggregates.by_type, features.property_type(), predicted),
            by_rooms: merge_rooms(aggregates.by_rooms, features.rooms(), predicted),
            by_distance: merge_distance(aggregates.by_distance, features.distance_km(), predicted),
        }
    }

    /// Base series only, used when there is no prediction to overlay.
    pub fn without_overlay(aggregates: Aggregates) -> Self {
        Self {
            by_type: type_chart(aggregates.by_type, None),
            by_rooms: rooms_chart(aggregates.by_rooms, None),
            by_distance: distance_chart(aggregates.by_distance, None),
        }
    }
}

/// Highlights the type group, if the dataset has it.
pub fn merge_type(
    series: AggregateSeries<PropertyType>,
    property_type: PropertyType,
    predicted: f64,
) -> Chart<PropertyType> {
    let highlighted = series.position(&property_type).map(|index| (index, predicted));
    type_chart(series, highlighted)
}

/// Highlights the group with exactly the same room count, if the dataset has it.
pub fn merge_rooms(series: AggregateSeries<u32>, rooms: u8, predicted: f64) -> Chart<u32> {
    let highlighted = series.position(&u32::from(rooms)).map(|index| (index, predicted));
    rooms_chart(series, highlighted)
}

/// Highlights the bin containing the distance, falling back to the last bin.
pub fn merge_distance(
    series: AggregateSeries<DistanceBin>,
    distance_km: f64,
    predicted: f64,
) -> Chart<DistanceBin> {
    let bin = DistanceBin::ALL[DistanceBin::locate_or_last(distance_km)];
    let highlighted = series.position(&bin).map(|index| (index, predicted));
    distance_chart(series, highlighted)
}

fn type_chart(
    series: AggregateSeries<PropertyType>,
    highlighted: Option<(usize, f64)>,
) -> Chart<PropertyType> {
    Chart::new(
        "Price Distribution by Property Type",
        "Average Price of Property Type",
        series,
        highlighted,
    )
}

fn rooms_chart(series: AggregateSeries<u32>, highlighted: Option<(usize, f64)>) -> Chart<u32> {
    Chart::new(
        "Average Price by Number of Rooms",
        "Average Price by Number of Rooms",
        series,
        highlighted,
    )
}

fn distance_chart(
    series: AggregateSeries<DistanceBin>,
    highlighted: Option<(usize, f64)>,
) -> Chart<DistanceBin> {
    Chart::new("Average Price by Distance", "Average Price by Distance", series, highlighted)
}
