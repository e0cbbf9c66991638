use reqwest::Url;

use crate::prelude::*;

pub fn base_url(value: &str) -> Result<String> {
    let url = Url::parse(value)?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        scheme => Err(anyhow!("unsupported scheme `{}`", scheme)),
    }
}

pub fn sample_rate(value: &str) -> Result<f32> {
    match value.parse()? {
        value if (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(anyhow!("expected a number between 0 and 1")),
    }
}
