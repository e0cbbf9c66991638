//! Terminal rendering of the settled view.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::Serialize;

use crate::models::{Coordinates, FeatureVector};
use crate::overlay::{Chart, Charts};
use crate::view::{Generation, ViewState};

/// Price with two decimals and thousands separators, for display only.
#[derive(Debug, Copy, Clone)]
pub struct Price(pub f64);

impl Display for Price {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let formatted = format!("{:.2}", self.0.abs());
        let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
        let grouped = integer
            .as_bytes()
            .rchunks(3)
            .rev()
            .map(|chunk| String::from_utf8_lossy(chunk))
            .join(",");
        let sign = if self.0.is_sign_negative() && self.0 != 0.0 { "-" } else { "" };
        write!(formatter, "{}${}.{}", sign, grouped, fraction)
    }
}

/// JSON form of the view.
#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub state: &'static str,
    pub generation: Option<Generation>,
    pub features: Option<&'a FeatureVector>,
    pub predicted_price: Option<f64>,
    pub marker: Option<Coordinates>,
    pub charts: Option<&'a Charts>,
    pub errors: Vec<String>,
}

impl<'a> Snapshot<'a> {
    pub fn new(state: &'a ViewState, marker: Option<Coordinates>) -> Self {
        Self {
            state: state.name(),
            generation: state.generation(),
            features: state.features(),
            predicted_price: state.prediction().map(|prediction| prediction.value),
            marker,
            charts: state.charts(),
            errors: state
                .prediction_error()
                .map(|error| describe(error))
                .into_iter()
                .chain(state.dataset_error().map(|error| describe(error)))
                .collect(),
        }
    }
}

/// Error message followed by its sources.
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(error), |error| error.source()).join(": ")
}

/// Plain text form of the view.
pub struct View<'a> {
    pub state: &'a ViewState,
    pub marker: Option<Coordinates>,

    /// Overrides the predicted price while it is being animated.
    pub displayed_price: Option<f64>,
}

impl Display for View<'_> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.state.is_fetching() {
            writeln!(formatter, "Loading…")?;
        }
        if let Some(prediction) = self.state.prediction() {
            let price = self.displayed_price.unwrap_or(prediction.value);
            writeln!(formatter, "Predicted Price: {}", Price(price))?;
        }
        if self.state.prediction_error().is_some() {
            writeln!(formatter, "Error fetching prediction.")?;
        }
        if let Some(marker) = self.marker {
            writeln!(formatter, "Postcode Location: {:.4}, {:.4}", marker.lat, marker.lng)?;
        }
        if let Some(charts) = self.state.charts() {
            write_chart(formatter, &charts.by_type)?;
            write_chart(formatter, &charts.by_rooms)?;
            write_chart(formatter, &charts.by_distance)?;
        }
        if self.state.dataset_error().is_some() {
            writeln!(formatter, "Error loading chart data.")?;
        }
        Ok(())
    }
}

/// Renders the view as plain text.
pub fn render(state: &ViewState, marker: Option<Coordinates>, displayed_price: Option<f64>) -> String {
    View { state, marker, displayed_price }.to_string()
}

fn write_chart<K: Display>(formatter: &mut Formatter<'_>, chart: &Chart<K>) -> std::fmt::Result {
    writeln!(formatter, "\n{}", chart.title)?;
    let [base, overlay] = chart.layers();
    writeln!(formatter, "  {:<10} {:>18}  {}", "", base.label, overlay.label)?;
    for point in &chart.points {
        write!(formatter, "  {:<10} {:>18}", point.key.to_string(), Price(point.average).to_string())?;
        match point.overlay {
            Some(predicted) => writeln!(formatter, "  ★ {}", Price(predicted))?,
            None => writeln!(formatter)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::backend::{DatasetUnavailable, TransportError};
    use crate::models::{PredictionResult, RawRecord};
    use crate::validation::{validate, RawFeatures};
    use crate::view::{Event, Resolution};

    fn submitted() -> crate::Result<(Generation, ViewState)> {
        let generation = Generation::default().next();
        let features = validate(&RawFeatures {
            rooms: "3".to_string(),
            property_type: "u".to_string(),
            postcode: "3067".to_string(),
            distance_km: "7".to_string(),
        })?;
        Ok((generation, ViewState::Idle.apply(generation, Event::Submitted(features))))
    }

    fn predicted(value: f64) -> Event {
        Event::Resolved(Resolution::Prediction(Ok(PredictionResult { value })))
    }

    #[test]
    fn price_ok() {
        assert_eq!(Price(0.0).to_string(), "$0.00");
        assert_eq!(Price(999.5).to_string(), "$999.50");
        assert_eq!(Price(1000.0).to_string(), "$1,000.00");
        assert_eq!(Price(650_000.125_1).to_string(), "$650,000.13");
        assert_eq!(Price(1_234_567.891).to_string(), "$1,234,567.89");
        assert_eq!(Price(-1500.0).to_string(), "-$1,500.00");
    }

    #[test]
    fn render_ready_ok() -> crate::Result {
        let (generation, state) = submitted()?;
        let records: Vec<RawRecord> = serde_json::from_value(json!([
            {"Type": "u", "Rooms": 3, "Distance": 6.0, "Price": 600000},
        ]))?;
        let state = state
            .apply(generation, predicted(650_000.0))
            .apply(generation, Event::Resolved(Resolution::Dataset(Ok(records))));
        let output = render(&state, Some(Coordinates::default()), None);
        assert!(output.starts_with("Predicted Price: $650,000.00\n"));
        assert!(output.contains("Postcode Location: -37.8136, 144.9631"));
        assert!(output.contains("Price Distribution by Property Type"));
        assert_eq!(output.matches('★').count(), 3);
        assert!(!output.contains("Error"));
        Ok(())
    }

    #[test]
    fn view_display_ok() -> crate::Result {
        let (_, state) = submitted()?;
        let view = View {
            state: &state,
            marker: None,
            displayed_price: None,
        };
        assert_eq!(view.to_string(), "Loading…\n");
        Ok(())
    }

    #[test]
    fn render_dataset_error_ok() -> crate::Result {
        let (generation, state) = submitted()?;
        let error = DatasetUnavailable(TransportError::Status(StatusCode::NOT_FOUND));
        let state = state
            .apply(generation, Event::Resolved(Resolution::Dataset(Err(error))))
            .apply(generation, predicted(1.0));
        let output = render(&state, None, Some(0.5));
        assert!(output.contains("Predicted Price: $0.50"));
        assert!(output.contains("Error loading chart data."));
        assert!(!output.contains('★'));
        Ok(())
    }

    #[test]
    fn snapshot_ok() -> crate::Result {
        let (generation, state) = submitted()?;
        let state = state.apply(generation, predicted(1.0));
        let snapshot = serde_json::to_value(Snapshot::new(&state, None))?;
        assert_eq!(snapshot["state"], json!("fetching"));
        assert_eq!(snapshot["predicted_price"], json!(1.0));
        assert_eq!(snapshot["charts"], json!(null));
        assert_eq!(snapshot["features"]["type"], json!("u"));
        Ok(())
    }

    #[test]
    fn snapshot_describes_error_sources() -> crate::Result {
        let (generation, state) = submitted()?;
        let error = DatasetUnavailable(TransportError::Status(StatusCode::NOT_FOUND));
        let state = state
            .apply(generation, Event::Resolved(Resolution::Dataset(Err(error))))
            .apply(generation, predicted(1.0));
        let snapshot = Snapshot::new(&state, None);
        assert_eq!(
            snapshot.errors,
            vec!["reference dataset is unavailable: unexpected status 404 Not Found".to_string()],
        );
        Ok(())
    }
}
