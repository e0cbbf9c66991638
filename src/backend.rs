//! Remote prediction model and reference dataset.

use async_trait::async_trait;
use reqwest::StatusCode;

pub use self::client::Client;
use crate::models::{FeatureVector, PredictionResult, RawRecord};

mod client;
mod requests;
mod responses;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request has failed")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("could not parse JSON")]
    MalformedBody(#[source] serde_json::Error),

    #[error("the call has panicked")]
    Panicked,
}

#[derive(Debug, thiserror::Error)]
#[error("prediction is unavailable")]
pub struct PredictionUnavailable(#[from] pub TransportError);

#[derive(Debug, thiserror::Error)]
#[error("reference dataset is unavailable")]
pub struct DatasetUnavailable(#[from] pub TransportError);

#[async_trait]
pub trait Backend: Send + Sync {
    /// Requests a point prediction for the features. Never retries.
    async fn predict(
        &self,
        features: &FeatureVector,
    ) -> Result<PredictionResult, PredictionUnavailable>;

    /// Fetches the raw reference dataset.
    async fn fetch_dataset(&self) -> Result<Vec<RawRecord>, DatasetUnavailable>;
}
