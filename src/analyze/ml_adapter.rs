//! Optional ML augmentation: classifier abstraction + per-call failure boundary.
//!
//! The pipeline never requires a model. Every call goes through
//! [`MlAugmenter`], which turns errors, malformed predictions and panics into
//! `None` so callers fall back to the lexicon path.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Model input is capped; longer messages are cut at a char boundary.
pub const MAX_MODEL_CHARS: usize = 500;

/// Top-1 output of a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[derive(Debug, Error)]
pub enum MlError {
    #[error("classifier unavailable")]
    Unavailable,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("malformed prediction: {0}")]
    Malformed(String),
    #[error("model load failed: {0}")]
    Load(String),
}

/// Synchronous text classifier. Implementations must be cheap to share.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Prediction, MlError>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
    fn available(&self) -> bool {
        true
    }
}

pub type DynClassifier = Arc<dyn TextClassifier>;

/// Always unavailable. Used when ML is off or a model failed to load.
pub struct DisabledClassifier;

impl TextClassifier for DisabledClassifier {
    fn classify(&self, _text: &str) -> Result<Prediction, MlError> {
        Err(MlError::Unavailable)
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
    fn available(&self) -> bool {
        false
    }
}

/// Deterministic classifier returning a fixed prediction (`ML_TEST_MODE=mock`).
pub struct MockClassifier {
    pub fixed: Prediction,
}

impl TextClassifier for MockClassifier {
    fn classify(&self, _text: &str) -> Result<Prediction, MlError> {
        Ok(self.fixed.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Polarity decoded from a sentiment prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polarity {
    pub positive: bool,
    pub confidence: f32,
}

impl Polarity {
    /// Maps onto the lexicon scale: `±confidence × 10`.
    pub fn signed_score(&self) -> f32 {
        let magnitude = self.confidence * 10.0;
        if self.positive {
            magnitude
        } else {
            -magnitude
        }
    }

    fn from_prediction(p: &Prediction) -> Result<Self, MlError> {
        let positive = match p.label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_1" => true,
            "negative" | "neg" | "label_0" => false,
            other => {
                return Err(MlError::Malformed(format!(
                    "unknown polarity label `{other}`"
                )))
            }
        };
        Ok(Self {
            positive,
            confidence: p.confidence,
        })
    }
}

/// The two optional capabilities, each behind a failure boundary.
#[derive(Clone)]
pub struct MlAugmenter {
    category: DynClassifier,
    polarity: DynClassifier,
}

impl fmt::Debug for MlAugmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MlAugmenter")
            .field("category", &self.category.name())
            .field("polarity", &self.polarity.name())
            .finish()
    }
}

impl Default for MlAugmenter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl MlAugmenter {
    pub fn new(category: DynClassifier, polarity: DynClassifier) -> Self {
        Self { category, polarity }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledClassifier), Arc::new(DisabledClassifier))
    }

    pub fn with_category(mut self, classifier: DynClassifier) -> Self {
        self.category = classifier;
        self
    }

    pub fn with_polarity(mut self, classifier: DynClassifier) -> Self {
        self.polarity = classifier;
        self
    }

    pub fn category_enabled(&self) -> bool {
        self.category.available()
    }

    pub fn polarity_enabled(&self) -> bool {
        self.polarity.available()
    }

    pub fn category_provider(&self) -> &'static str {
        self.category.name()
    }

    pub fn polarity_provider(&self) -> &'static str {
        self.polarity.name()
    }

    /// Top-1 product category, or `None` when unavailable.
    pub fn category(&self, text: &str) -> Option<Prediction> {
        guarded("category", &self.category, text)
    }

    /// Message polarity, or `None` when unavailable.
    pub fn polarity(&self, text: &str) -> Option<Polarity> {
        let prediction = guarded("polarity", &self.polarity, text)?;
        match Polarity::from_prediction(&prediction) {
            Ok(p) => Some(p),
            Err(e) => {
                fallback("polarity", self.polarity.name(), &e);
                None
            }
        }
    }
}

fn guarded(capability: &'static str, classifier: &DynClassifier, text: &str) -> Option<Prediction> {
    if !classifier.available() {
        return None;
    }
    let input = truncate_chars(text, MAX_MODEL_CHARS);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(input)))
        .unwrap_or_else(|_| Err(MlError::Inference("classifier panicked".to_string())));

    match outcome.and_then(validate) {
        Ok(p) => Some(p),
        Err(MlError::Unavailable) => None,
        Err(e) => {
            fallback(capability, classifier.name(), &e);
            None
        }
    }
}

fn fallback(capability: &'static str, provider: &'static str, error: &MlError) {
    warn!(capability, provider, error = %error, "ml augmentation skipped; lexicon path only");
    counter!("triage_ml_fallback_total", "capability" => capability).increment(1);
}

fn validate(p: Prediction) -> Result<Prediction, MlError> {
    if p.label.trim().is_empty() {
        return Err(MlError::Malformed("blank label".to_string()));
    }
    if !p.confidence.is_finite() || !(0.0..=1.0).contains(&p.confidence) {
        return Err(MlError::Malformed(format!(
            "confidence {} outside [0, 1]",
            p.confidence
        )));
    }
    Ok(Prediction {
        label: p.label.trim().to_string(),
        confidence: p.confidence,
    })
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;
    impl TextClassifier for Failing {
        fn classify(&self, _text: &str) -> Result<Prediction, MlError> {
            Err(MlError::Inference("backend down".into()))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Panicking;
    impl TextClassifier for Panicking {
        fn classify(&self, _text: &str) -> Result<Prediction, MlError> {
            panic!("tensor shape mismatch")
        }
        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    fn mock(label: &str, confidence: f32) -> DynClassifier {
        Arc::new(MockClassifier {
            fixed: Prediction::new(label, confidence),
        })
    }

    #[test]
    fn disabled_yields_nothing() {
        let ml = MlAugmenter::disabled();
        assert!(!ml.category_enabled());
        assert!(ml.category("iphone").is_none());
        assert!(ml.polarity("love it").is_none());
    }

    #[test]
    fn errors_and_panics_are_swallowed() {
        let ml = MlAugmenter::new(Arc::new(Failing), Arc::new(Panicking));
        assert!(ml.category("anything").is_none());
        assert!(ml.polarity("anything").is_none());
    }

    #[test]
    fn malformed_predictions_are_rejected() {
        let ml = MlAugmenter::disabled().with_category(mock("  ", 0.9));
        assert!(ml.category("x").is_none());

        let ml = MlAugmenter::disabled().with_category(mock("iPhone", 1.7));
        assert!(ml.category("x").is_none());

        let ml = MlAugmenter::disabled().with_polarity(mock("sarcastic", 0.9));
        assert!(ml.polarity("x").is_none());
    }

    #[test]
    fn polarity_maps_to_signed_score() {
        let ml = MlAugmenter::disabled().with_polarity(mock("NEGATIVE", 0.8));
        let p = ml.polarity("bad").unwrap();
        assert!(!p.positive);
        assert!((p.signed_score() + 8.0).abs() < 1e-5);

        let ml = MlAugmenter::disabled().with_polarity(mock("POSITIVE", 0.5));
        assert!((ml.polarity("ok").unwrap().signed_score() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "අද".repeat(400);
        let cut = truncate_chars(&s, MAX_MODEL_CHARS);
        assert_eq!(cut.chars().count(), MAX_MODEL_CHARS);
        assert_eq!(truncate_chars("short", MAX_MODEL_CHARS), "short");
    }
}
