//! Turns a validated payload into a label and a confidence score.

use thiserror::Error;

use crate::features::{Feature, FeatureVector, FEATURE_COUNT};
use crate::validation::{coerce_number, Payload};

/// Any failure while building features, predicting, or reading probabilities.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InferenceError(pub String);

impl InferenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A pre-trained classifier loaded once at startup and shared read-only.
pub trait Classifier: Send + Sync {
    /// Labels the model knows about, in the order its probability rows use.
    fn classes(&self) -> &[String];

    fn predict(&self, features: &FeatureVector) -> Result<String, InferenceError>;

    /// Probability of each entry in [`Classifier::classes`]. `Ok(None)` means
    /// the model has no probability estimate.
    fn predict_proba(
        &self,
        _features: &FeatureVector,
    ) -> Result<Option<Vec<f32>>, InferenceError> {
        Ok(None)
    }

    /// Label and probabilities together. Models that produce both from a
    /// single execution should override this.
    fn predict_with_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<(String, Option<Vec<f32>>), InferenceError> {
        let label = self.predict(features)?;
        let probs = self.predict_proba(features)?;
        Ok((label, probs))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Reads the seven measurements in training order.
pub fn extract_features(payload: &Payload) -> Result<FeatureVector, InferenceError> {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, feature) in values.iter_mut().zip(Feature::ALL) {
        let raw = payload
            .get(feature.name())
            .ok_or_else(|| InferenceError::new(format!("missing feature '{}'", feature)))?;
        *slot = coerce_number(raw)
            .map_err(|e| InferenceError::new(format!("feature '{}': {}", feature, e)))?;
    }
    Ok(FeatureVector::new(values))
}

pub fn predict_from_model(
    model: &dyn Classifier,
    payload: &Payload,
) -> Result<Prediction, InferenceError> {
    let features = extract_features(payload)?;
    let (label, probs) = model.predict_with_proba(&features)?;

    let confidence = match probs {
        Some(probs) => {
            let idx = model
                .classes()
                .iter()
                .position(|c| *c == label)
                .ok_or_else(|| {
                    InferenceError::new(format!("'{}' is not in the model's class list", label))
                })?;
            let p = probs.get(idx).copied().ok_or_else(|| {
                InferenceError::new(format!(
                    "probability row has {} entries, expected at least {}",
                    probs.len(),
                    idx + 1
                ))
            })?;
            if !p.is_finite() {
                return Err(InferenceError::new(format!(
                    "probability for '{}' is not a finite number",
                    label
                )));
            }
            f64::from(p).clamp(0.0, 1.0)
        }
        None => 1.0,
    };

    Ok(Prediction { label, confidence })
}
