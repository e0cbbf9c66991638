#![warn(clippy::all)]

use std::io::Write;

use clap::{crate_version, Parser};

use crate::backend::Client;
use crate::geocode::{FixedGeocoder, Geocoder, OpenCage};
use crate::opts::Opts;
use crate::prelude::*;
use crate::render::{render, Price, Snapshot};
use crate::session::Session;
use crate::validation::RawFeatures;

mod aggregation;
mod animation;
mod backend;
mod geocode;
mod helpers;
mod models;
mod opts;
mod overlay;
mod prelude;
mod render;
mod session;
mod validation;
mod view;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let opts = Opts::parse();
    let _sentry_guard = helpers::tracing::init(opts.sentry_dsn.clone(), opts.traces_sample_rate)?;
    info!(version = crate_version!(), "starting…");
    let result = run(opts).await;
    if let Err(error) = &result {
        sentry::integrations::anyhow::capture_anyhow(error);
    }
    result
}

async fn run(opts: Opts) -> Result {
    let backend = Client::new(&opts.backend.base_url, opts.backend.timeout)?;
    let geocoder: Arc<dyn Geocoder> = match &opts.geocoder.geocoder_key {
        Some(api_key) => Arc::new(OpenCage::new(
            &opts.geocoder.geocoder_url,
            api_key,
            opts.backend.timeout,
        )?),
        None => Arc::new(FixedGeocoder),
    };
    let mut session = Session::new(Arc::new(backend), geocoder, opts.tick);

    let raw = RawFeatures::from(opts.features);
    session.submit(&raw)?;

    if opts.animate {
        while session.state().is_fetching() && session.animator().is_none() {
            session.next().await;
        }
        if let Some(animator) = session.animator() {
            let mut receiver = animator.subscribe();
            while receiver.changed().await.is_ok() {
                let displayed = *receiver.borrow();
                eprint!("\rPredicted Price: {}", Price(displayed));
                let _ = std::io::stderr().flush();
            }
            eprintln!();
        }
    }

    session.settle().await;
    let state = session.state();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&Snapshot::new(state, session.marker()))?);
    } else {
        print!("{}", render(state, session.marker(), None));
    }
    session.tear_down();
    Ok(())
}
