use async_trait::async_trait;
use clap::{crate_name, crate_version};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::backend::requests::PredictRequest;
use crate::backend::responses::PredictResponse;
use crate::backend::{Backend, DatasetUnavailable, PredictionUnavailable, TransportError};
use crate::models::{FeatureVector, PredictionResult, RawRecord};
use crate::prelude::*;

/// HTTP client of the model backend.
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(crate_name!(), "/", crate_version!()))
            .timeout(timeout)
            .build()
            .context("failed to build the HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let start_instant = Instant::now();
        let response = request.send().await.map_err(TransportError::Request)?;
        let status = response.status();
        debug!(url = %response.url(), %status, elapsed = ?start_instant.elapsed());
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }
        let body = response.bytes().await.map_err(TransportError::Request)?;
        serde_json::from_slice(&body).map_err(TransportError::MalformedBody)
    }
}

#[async_trait]
impl Backend for Client {
    #[instrument(level = "info", skip_all, fields(rooms = features.rooms(), postcode = %features.postcode()))]
    async fn predict(
        &self,
        features: &FeatureVector,
    ) -> Result<PredictionResult, PredictionUnavailable> {
        let request = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&PredictRequest::from(features));
        let response: PredictResponse = self.call(request).await?;
        info!(predicted_price = response.predicted_price);
        Ok(PredictionResult {
            value: response.predicted_price,
        })
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_dataset(&self) -> Result<Vec<RawRecord>, DatasetUnavailable> {
        let request = self.client.get(format!("{}/data", self.base_url));
        let records: Vec<RawRecord> = self.call(request).await?;
        info!(n_records = records.len());
        Ok(records)
    }
}
