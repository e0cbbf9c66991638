//! Approximate location of a postcode for the map marker.

use async_trait::async_trait;
use clap::{crate_name, crate_version};
use serde::Deserialize;

use crate::models::{Coordinates, Postcode};
use crate::prelude::*;

/// Postcode lookup. Never fails: any problem yields [`Coordinates::default`].
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, postcode: &Postcode) -> Coordinates;
}

/// Always answers with the default coordinates.
pub struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn locate(&self, _postcode: &Postcode) -> Coordinates {
        Coordinates::default()
    }
}

/// See: <https://opencagedata.com/api>.
pub struct OpenCage {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    geometry: Coordinates,
}

impl OpenCage {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: StdDuration,
    ) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(concat!(crate_name!(), "/", crate_version!()))
                .timeout(timeout)
                .build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn try_locate(&self, postcode: &Postcode) -> Result<Option<Coordinates>> {
        let query = format!("{},Australia", postcode);
        let response = self
            .client
            .get(format!("{}/geocode/v1/json", self.base_url))
            .query(&[("q", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("request has failed")?
            .error_for_status()?
            .json::<Response>()
            .await
            .context("could not parse JSON")?;
        Ok(response.results.into_iter().next().map(|result| result.geometry))
    }
}

#[async_trait]
impl Geocoder for OpenCage {
    #[instrument(level = "debug", skip_all, fields(postcode = %postcode))]
    async fn locate(&self, postcode: &Postcode) -> Coordinates {
        match self.try_locate(postcode).await {
            Ok(Some(coordinates)) => {
                debug!(lat = coordinates.lat, lng = coordinates.lng, "located");
                coordinates
            }
            Ok(None) => {
                warn!("no results found for the postcode");
                Coordinates::default()
            }
            Err(error) => {
                warn!("failed to locate the postcode: {:#}", error);
                Coordinates::default()
            }
        }
    }
}
