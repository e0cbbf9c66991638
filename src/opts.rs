//! CLI options.

use clap::Parser;

use crate::prelude::*;
use crate::validation::RawFeatures;

pub mod parsers;

/// Estimates a property price and puts it in the context of the reference dataset.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Opts {
    /// Sentry DSN
    #[arg(long, env = "SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    /// Sentry performance monitoring sample rate
    #[arg(long, default_value = "0.0", value_parser = parsers::sample_rate)]
    pub traces_sample_rate: f32,

    #[command(flatten)]
    pub backend: BackendOpts,

    #[command(flatten)]
    pub geocoder: GeocoderOpts,

    #[command(flatten)]
    pub features: FeatureOpts,

    /// Displayed price animation tick
    #[arg(long, default_value = "20ms", value_parser = humantime::parse_duration)]
    pub tick: StdDuration,

    /// Print the ramping price while waiting for the charts
    #[arg(long)]
    pub animate: bool,

    /// Print the settled view as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct BackendOpts {
    /// Model backend base URL
    #[arg(
        long = "base-url",
        env = "PRICE_CONTEXT_BASE_URL",
        default_value = "http://localhost:8000",
        value_parser = parsers::base_url,
    )]
    pub base_url: String,

    /// Remote call timeout
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: StdDuration,
}

#[derive(clap::Args)]
pub struct GeocoderOpts {
    /// OpenCage geocoding API base URL
    #[arg(long, default_value = "https://api.opencagedata.com", value_parser = parsers::base_url)]
    pub geocoder_url: String,

    /// OpenCage geocoding API key, the map marker stays at the default location without it
    #[arg(long, env = "PRICE_CONTEXT_GEOCODER_KEY")]
    pub geocoder_key: Option<String>,
}

/// Property features, validated only once submitted.
#[derive(clap::Args)]
pub struct FeatureOpts {
    /// Number of rooms, 1 to 7
    #[arg(long)]
    pub rooms: String,

    /// Property type: `h` (house), `t` (townhouse) or `u` (unit)
    #[arg(long = "type")]
    pub property_type: String,

    /// Four-digit postcode
    #[arg(long)]
    pub postcode: String,

    /// Distance from the city centre in kilometres, 1 to 50
    #[arg(long)]
    pub distance: String,
}

impl From<FeatureOpts> for RawFeatures {
    fn from(opts: FeatureOpts) -> Self {
        Self {
            rooms: opts.rooms,
            property_type: opts.property_type,
            postcode: opts.postcode,
            distance_km: opts.distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_ok() {
        Opts::command().debug_assert();
    }

    #[test]
    fn parse_ok() -> crate::Result {
        let opts = Opts::try_parse_from([
            "price-context",
            "--base-url",
            "http://127.0.0.1:8000/",
            "--rooms",
            "3",
            "--type",
            "u",
            "--postcode",
            "3067",
            "--distance",
            "7",
            "--tick",
            "40ms",
        ])?;
        assert_eq!(opts.backend.base_url, "http://127.0.0.1:8000/");
        assert_eq!(opts.tick, StdDuration::from_millis(40));
        let raw = RawFeatures::from(opts.features);
        assert_eq!(raw.distance_km, "7");
        Ok(())
    }

    #[test]
    fn parse_invalid_base_url_fails() {
        let result = Opts::try_parse_from([
            "price-context",
            "--base-url",
            "localhost:8000",
            "--rooms",
            "3",
            "--type",
            "u",
            "--postcode",
            "3067",
            "--distance",
            "7",
        ]);
        assert!(result.is_err());
    }
}
