//! Event loop driving one prediction view.

use std::future::Future;
use std::mem;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::animation::Animator;
use crate::backend::{Backend, TransportError};
use crate::geocode::Geocoder;
use crate::models::Coordinates;
use crate::prelude::*;
use crate::validation::{validate, RawFeatures, ValidationError};
use crate::view::{Event, Generation, Resolution, ViewState};

#[derive(Debug)]
enum Message {
    Resolved(Resolution),
    Located(Coordinates),
}

#[derive(Debug)]
struct Envelope {
    generation: Generation,
    message: Message,
}

/// Issues the remote calls of a submission concurrently and applies their results as they
/// arrive.
///
/// Every result is tagged with the generation of its submission, and is dropped when a newer
/// submission or a tear-down has happened in between.
pub struct Session {
    backend: Arc<dyn Backend>,
    geocoder: Arc<dyn Geocoder>,
    tick: StdDuration,

    generation: Generation,
    state: ViewState,
    marker: Option<Coordinates>,
    animator: Option<Animator>,

    tasks: Vec<JoinHandle<()>>,
    n_pending: usize,
    sender: mpsc::UnboundedSender<Envelope>,
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>, geocoder: Arc<dyn Geocoder>, tick: StdDuration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            backend,
            geocoder,
            tick,
            generation: Generation::default(),
            state: ViewState::Idle,
            marker: None,
            animator: None,
            tasks: Vec::new(),
            n_pending: 0,
            sender,
            receiver,
        }
    }

    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Map marker of the current submission, once located.
    pub const fn marker(&self) -> Option<Coordinates> {
        self.marker
    }

    pub const fn animator(&self) -> Option<&Animator> {
        self.animator.as_ref()
    }

    /// Validates the input and starts the prediction, dataset and geocoding calls.
    ///
    /// Invalid input is rejected before anything is sent and leaves the state untouched.
    #[instrument(level = "info", skip_all)]
    pub fn submit(&mut self, raw: &RawFeatures) -> Result<Generation, ValidationError> {
        let features = validate(raw)?;
        self.reset();
        let generation = self.generation;
        info!(%generation, rooms = features.rooms(), property_type = %features.property_type());
        self.apply(Event::Submitted(features.clone()));

        let backend = Arc::clone(&self.backend);
        let predicted_features = features.clone();
        self.spawn(
            async move {
                Message::Resolved(Resolution::Prediction(backend.predict(&predicted_features).await))
            },
            || Message::Resolved(Resolution::Prediction(Err(TransportError::Panicked.into()))),
        );

        let backend = Arc::clone(&self.backend);
        self.spawn(
            async move { Message::Resolved(Resolution::Dataset(backend.fetch_dataset().await)) },
            || Message::Resolved(Resolution::Dataset(Err(TransportError::Panicked.into()))),
        );

        let geocoder = Arc::clone(&self.geocoder);
        self.spawn(
            async move { Message::Located(geocoder.locate(features.postcode()).await) },
            || Message::Located(Coordinates::default()),
        );

        Ok(generation)
    }

    /// Waits for the next result and applies it.
    pub async fn next(&mut self) {
        let envelope = match self.receiver.recv().await {
            Some(envelope) => envelope,
            None => return,
        };
        if envelope.generation != self.generation {
            debug!(generation = %envelope.generation, current = %self.generation, "stale message");
            return;
        }
        self.n_pending = self.n_pending.saturating_sub(1);

        match envelope.message {
            Message::Located(coordinates) => {
                self.marker = Some(coordinates);
            }
            Message::Resolved(resolution) => {
                let target = match &resolution {
                    Resolution::Prediction(Ok(prediction)) => Some(prediction.value),
                    _ => None,
                };
                self.apply(Event::Resolved(resolution));
                if let Some(target) = target {
                    // The displayed price does not wait for the dataset.
                    self.animator = Some(Animator::start(target, self.tick));
                }
            }
        }
    }

    /// Processes results until every call of the current submission has reported.
    pub async fn settle(&mut self) -> &ViewState {
        while self.n_pending != 0 {
            self.next().await;
        }
        info!(generation = %self.generation, state = self.state.name(), "settled");
        &self.state
    }

    /// Abandons the current submission: outstanding results are discarded on arrival.
    #[instrument(level = "info", skip_all)]
    pub fn tear_down(&mut self) {
        self.reset();
        self.apply(Event::TornDown);
    }

    /// Starts a new generation and cancels everything of the previous one.
    fn reset(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.generation = self.generation.next();
        self.n_pending = 0;
        self.marker = None;
        if let Some(animator) = self.animator.take() {
            animator.cancel();
        }
    }

    fn apply(&mut self, event: Event) {
        let state = mem::take(&mut self.state);
        self.state = state.apply(self.generation, event);
        debug!(generation = %self.generation, state = self.state.name());
    }

    /// Runs the call in a task. A panicking call reports the fallback message instead.
    fn spawn(
        &mut self,
        call: impl Future<Output = Message> + Send + 'static,
        fallback: impl FnOnce() -> Message + Send + 'static,
    ) {
        let generation = self.generation;
        let sender = self.sender.clone();
        self.n_pending += 1;
        self.tasks.push(tokio::spawn(async move {
            let message = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(message) => message,
                Err(_) => {
                    warn!(%generation, "the call has panicked");
                    fallback()
                }
            };
            if sender.send(Envelope { generation, message }).is_err() {
                debug!(%generation, "the session is gone");
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use tokio::time::sleep;

    use super::*;
    use crate::animation::DEFAULT_TICK;
    use crate::backend::{DatasetUnavailable, PredictionUnavailable, TransportError};
    use crate::geocode::FixedGeocoder;
    use crate::models::{FeatureVector, PredictionResult, PropertyType, RawRecord};

    struct FakeBackend {
        price: Option<f64>,
        prediction_delay: StdDuration,
        dataset: Option<serde_json::Value>,
        dataset_delay: StdDuration,
        n_calls: AtomicUsize,
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self {
                price: Some(650_000.0),
                prediction_delay: StdDuration::from_millis(10),
                dataset: Some(json!([
                    {"Type": "u", "Rooms": 3, "Distance": 6.0, "Price": 600000},
                    {"Type": "h", "Rooms": 4, "Distance": 12.0, "Price": 1200000},
                ])),
                dataset_delay: StdDuration::from_millis(30),
                n_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn predict(
            &self,
            _features: &FeatureVector,
        ) -> Result<PredictionResult, PredictionUnavailable> {
            self.n_calls.fetch_add(1, Ordering::Relaxed);
            sleep(self.prediction_delay).await;
            self.price
                .map(|value| PredictionResult { value })
                .ok_or(PredictionUnavailable(TransportError::Status(StatusCode::BAD_GATEWAY)))
        }

        async fn fetch_dataset(&self) -> Result<Vec<RawRecord>, DatasetUnavailable> {
            self.n_calls.fetch_add(1, Ordering::Relaxed);
            sleep(self.dataset_delay).await;
            match &self.dataset {
                Some(dataset) => Ok(serde_json::from_value(dataset.clone())
                    .map_err(TransportError::MalformedBody)?),
                None => Err(DatasetUnavailable(TransportError::Status(StatusCode::NOT_FOUND))),
            }
        }
    }

    fn session(backend: FakeBackend) -> (Session, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let session = Session::new(backend.clone(), Arc::new(FixedGeocoder), DEFAULT_TICK);
        (session, backend)
    }

    fn raw(rooms: &str) -> RawFeatures {
        RawFeatures {
            rooms: rooms.to_string(),
            property_type: "u".to_string(),
            postcode: "3067".to_string(),
            distance_km: "7".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn settle_ready() -> crate::Result {
        let (mut session, _) = session(FakeBackend::default());
        session.submit(&raw("3"))?;
        let state = session.settle().await;
        assert_eq!(state.name(), "ready");
        let charts = state.charts().ok_or_else(|| anyhow!("no charts"))?;
        assert_eq!(charts.by_type.highlighted().map(|point| point.key), Some(PropertyType::Unit));
        assert_eq!(charts.by_rooms.highlighted().map(|point| point.key), Some(3));
        assert_eq!(session.marker(), Some(Coordinates::default()));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_never_reaches_backend() {
        let (mut session, backend) = session(FakeBackend::default());
        assert!(session.submit(&raw("12")).is_err());
        sleep(StdDuration::from_secs(1)).await;
        assert_eq!(backend.n_calls.load(Ordering::Relaxed), 0);
        assert_eq!(session.state().name(), "idle");
    }

    #[tokio::test(start_paused = true)]
    async fn animation_starts_before_dataset() -> crate::Result {
        let (mut session, _) = session(FakeBackend {
            dataset_delay: StdDuration::from_secs(10),
            ..Default::default()
        });
        session.submit(&raw("3"))?;
        while session.state().prediction().is_none() {
            session.next().await;
        }
        assert!(session.state().is_fetching());
        assert!(session.state().charts().is_none());
        assert!(session.animator().is_some());

        sleep(DEFAULT_TICK * 51).await;
        assert_eq!(session.animator().map(Animator::displayed), Some(650_000.0));
        assert!(session.state().is_fetching());

        assert_eq!(session.settle().await.name(), "ready");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dataset_failure_keeps_prediction() -> crate::Result {
        let (mut session, _) = session(FakeBackend {
            dataset: None,
            ..Default::default()
        });
        session.submit(&raw("3"))?;
        let state = session.settle().await;
        assert_eq!(state.name(), "partial error");
        assert_eq!(state.prediction().map(|prediction| prediction.value), Some(650_000.0));
        assert!(state.charts().is_none());
        assert!(session.animator().is_some());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn prediction_failure_keeps_charts() -> crate::Result {
        let (mut session, _) = session(FakeBackend {
            price: None,
            ..Default::default()
        });
        session.submit(&raw("3"))?;
        let state = session.settle().await;
        assert_eq!(state.name(), "partial error");
        assert!(state.prediction().is_none());
        assert!(state.charts().is_some());
        assert!(session.animator().is_none());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn resubmission_discards_previous_results() -> crate::Result {
        let (mut session, _) = session(FakeBackend::default());
        let first = session.submit(&raw("3"))?;
        let second = session.submit(&raw("4"))?;
        assert!(second > first);
        let state = session.settle().await;
        assert_eq!(state.generation(), Some(second));
        assert_eq!(state.features().map(FeatureVector::rooms), Some(4));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn tear_down_discards_in_flight_results() -> crate::Result {
        let (mut session, _) = session(FakeBackend::default());
        session.submit(&raw("3"))?;
        while session.animator().is_none() {
            session.next().await;
        }
        session.tear_down();
        assert!(session.animator().is_none());

        sleep(StdDuration::from_secs(1)).await;
        assert_eq!(session.settle().await.name(), "idle");
        assert_eq!(session.marker(), None);
        Ok(())
    }

    struct PanickingBackend;

    #[async_trait]
    impl Backend for PanickingBackend {
        async fn predict(
            &self,
            _features: &FeatureVector,
        ) -> Result<PredictionResult, PredictionUnavailable> {
            panic!("the model is broken");
        }

        async fn fetch_dataset(&self) -> Result<Vec<RawRecord>, DatasetUnavailable> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_call_settles_as_failure() -> crate::Result {
        let mut session =
            Session::new(Arc::new(PanickingBackend), Arc::new(FixedGeocoder), DEFAULT_TICK);
        session.submit(&raw("3"))?;
        let state = tokio::time::timeout(StdDuration::from_secs(2), session.settle()).await?;
        assert_eq!(state.name(), "partial error");
        assert!(matches!(
            state.prediction_error(),
            Some(PredictionUnavailable(TransportError::Panicked)),
        ));
        assert!(state.charts().is_some());
        assert!(session.animator().is_none());
        Ok(())
    }
}
