//! Prediction view as an explicit state machine with pure transitions.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::aggregation::Aggregates;
use crate::backend::{DatasetUnavailable, PredictionUnavailable};
use crate::models::{Dataset, FeatureVector, PredictionResult, RawRecord};
use crate::overlay::Charts;
use crate::prelude::*;

/// Identifies a submission. Results are applied only while their generation is current.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for Generation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum Resolution {
    Prediction(Result<PredictionResult, PredictionUnavailable>),
    Dataset(Result<Vec<RawRecord>, DatasetUnavailable>),
}

#[derive(Debug)]
pub enum Event {
    Submitted(FeatureVector),
    Resolved(Resolution),
    TornDown,
}

#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Idle,

    FetchingBoth(Fetching),
    Ready(Report),
    PartialError(PartialReport),
    Error(Failure),
}

/// Both calls are issued, nothing is rendered as complete until both have resolved.
#[derive(Debug)]
pub struct Fetching {
    pub generation: Generation,
    pub features: FeatureVector,
    pub prediction: Option<Result<PredictionResult, PredictionUnavailable>>,
    pub dataset: Option<Result<Dataset, DatasetUnavailable>>,
}

#[derive(Debug)]
pub struct Report {
    pub generation: Generation,
    pub features: FeatureVector,
    pub prediction: PredictionResult,
    pub charts: Charts,
}

/// Exactly one of the two calls has failed.
#[derive(Debug)]
pub enum PartialReport {
    WithoutCharts {
        generation: Generation,
        features: FeatureVector,
        prediction: PredictionResult,
        error: DatasetUnavailable,
    },

    /// The charts are shown without the overlay.
    WithoutPrediction {
        generation: Generation,
        features: FeatureVector,
        charts: Charts,
        error: PredictionUnavailable,
    },
}

#[derive(Debug)]
pub struct Failure {
    pub generation: Generation,
    pub features: FeatureVector,
    pub prediction_error: PredictionUnavailable,
    pub dataset_error: DatasetUnavailable,
}

impl ViewState {
    /// Applies the event produced under the generation.
    ///
    /// A submission always starts over. A resolution is applied only while fetching under the
    /// same generation, otherwise the state is returned unchanged.
    #[must_use]
    pub fn apply(self, generation: Generation, event: Event) -> Self {
        match (self, event) {
            (_, Event::TornDown) => Self::Idle,
            (_, Event::Submitted(features)) => Self::FetchingBoth(Fetching {
                generation,
                features,
                prediction: None,
                dataset: None,
            }),
            (Self::FetchingBoth(fetching), Event::Resolved(resolution))
                if fetching.generation == generation =>
            {
                fetching.resolve(resolution)
            }
            (state, Event::Resolved(_)) => {
                debug!(%generation, state = state.name(), "discarding a stale result");
                state
            }
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingBoth(_) => "fetching",
            Self::Ready(_) => "ready",
            Self::PartialError(_) => "partial error",
            Self::Error(_) => "error",
        }
    }

    pub const fn is_fetching(&self) -> bool {
        matches!(self, Self::FetchingBoth(_))
    }

    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::Idle => None,
            Self::FetchingBoth(Fetching { generation, .. })
            | Self::Ready(Report { generation, .. })
            | Self::PartialError(PartialReport::WithoutCharts { generation, .. })
            | Self::PartialError(PartialReport::WithoutPrediction { generation, .. })
            | Self::Error(Failure { generation, .. }) => Some(*generation),
        }
    }

    pub fn features(&self) -> Option<&FeatureVector> {
        match self {
            Self::Idle => None,
            Self::FetchingBoth(Fetching { features, .. })
            | Self::Ready(Report { features, .. })
            | Self::PartialError(PartialReport::WithoutCharts { features, .. })
            | Self::PartialError(PartialReport::WithoutPrediction { features, .. })
            | Self::Error(Failure { features, .. }) => Some(features),
        }
    }

    /// The prediction, available as soon as it arrives even if the dataset is still pending.
    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            Self::FetchingBoth(Fetching {
                prediction: Some(Ok(prediction)),
                ..
            })
            | Self::Ready(Report { prediction, .. })
            | Self::PartialError(PartialReport::WithoutCharts { prediction, .. }) => {
                Some(prediction)
            }
            _ => None,
        }
    }

    /// The charts, only once both calls have resolved.
    pub fn charts(&self) -> Option<&Charts> {
        match self {
            Self::Ready(Report { charts, .. })
            | Self::PartialError(PartialReport::WithoutPrediction { charts, .. }) => Some(charts),
            _ => None,
        }
    }

    pub fn prediction_error(&self) -> Option<&PredictionUnavailable> {
        match self {
            Self::PartialError(PartialReport::WithoutPrediction { error, .. }) => Some(error),
            Self::Error(Failure {
                prediction_error, ..
            }) => Some(prediction_error),
            _ => None,
        }
    }

    pub fn dataset_error(&self) -> Option<&DatasetUnavailable> {
        match self {
            Self::PartialError(PartialReport::WithoutCharts { error, .. }) => Some(error),
            Self::Error(Failure { dataset_error, .. }) => Some(dataset_error),
            _ => None,
        }
    }
}

impl Fetching {
    fn resolve(mut self, resolution: Resolution) -> ViewState {
        match resolution {
            Resolution::Prediction(result) if self.prediction.is_none() => {
                self.prediction = Some(result);
            }
            Resolution::Dataset(result) if self.dataset.is_none() => {
                self.dataset = Some(result.map(Dataset::from_raw));
            }
            resolution => {
                warn!(generation = %self.generation, ?resolution, "ignoring a repeated result");
            }
        }
        self.join()
    }

    /// Leaves the fetching state once both results are present.
    fn join(self) -> ViewState {
        let Self {
            generation,
            features,
            prediction,
            dataset,
        } = self;
        match (prediction, dataset) {
            (Some(Ok(prediction)), Some(Ok(dataset))) => {
                let aggregates = Aggregates::compute(&dataset.records);
                let charts = Charts::merge(aggregates, &features, prediction.value);
                ViewState::Ready(Report {
                    generation,
                    features,
                    prediction,
                    charts,
                })
            }
            (Some(Ok(prediction)), Some(Err(error))) => {
                ViewState::PartialError(PartialReport::WithoutCharts {
                    generation,
                    features,
                    prediction,
                    error,
                })
            }
            (Some(Err(error)), Some(Ok(dataset))) => {
                let charts = Charts::without_overlay(Aggregates::compute(&dataset.records));
                ViewState::PartialError(PartialReport::WithoutPrediction {
                    generation,
                    features,
                    charts,
                    error,
                })
            }
            (Some(Err(prediction_error)), Some(Err(dataset_error))) => ViewState::Error(Failure {
                generation,
                features,
                prediction_error,
                dataset_error,
            }),
            (prediction, dataset) => ViewState::FetchingBoth(Self {
                generation,
                features,
                prediction,
                dataset,
            }),
        }
    }
}
