use serde::{Deserialize, Serialize};

/// Point estimate returned by the remote model.
///
/// The value is kept at full precision: rounding happens only when it is displayed.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub value: f64,
}
