//! Token-weight naive-Bayes classifier loaded from JSON.
//!
//! Model file shape:
//! ```json
//! {
//!   "name": "category-nb",
//!   "classes": [
//!     { "label": "iPhone", "prior": 0.25, "default_weight": -9.0,
//!       "weights": { "iphone": -2.1, "ios": -3.4 } }
//!   ]
//! }
//! ```
//! Weights are log P(token | class). A class score is `ln(prior)` plus the
//! weight of every in-vocabulary token (`default_weight` when the class lacks
//! it); confidence is the softmax probability of the winning class.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ml_adapter::{MlError, Prediction, TextClassifier};

fn default_weight() -> f32 {
    -10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub label: String,
    pub prior: f32,
    #[serde(default = "default_weight")]
    pub default_weight: f32,
    #[serde(default)]
    pub weights: HashMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenModelSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub classes: Vec<ClassSpec>,
}

#[derive(Debug, Clone)]
pub struct TokenModel {
    name: Option<String>,
    classes: Vec<ClassSpec>,
    vocab: HashSet<String>,
}

impl TokenModel {
    pub fn from_spec(spec: TokenModelSpec) -> Result<Self, MlError> {
        if spec.classes.is_empty() {
            return Err(MlError::Load("model has no classes".to_string()));
        }

        let mut seen = HashSet::new();
        let mut classes = Vec::with_capacity(spec.classes.len());
        for mut class in spec.classes {
            class.label = class.label.trim().to_string();
            if class.label.is_empty() {
                return Err(MlError::Load("blank class label".to_string()));
            }
            if !seen.insert(class.label.clone()) {
                return Err(MlError::Load(format!("duplicate class `{}`", class.label)));
            }
            if !(class.prior.is_finite() && class.prior > 0.0) {
                return Err(MlError::Load(format!(
                    "class `{}` prior must be positive",
                    class.label
                )));
            }
            if !class.default_weight.is_finite() || class.weights.values().any(|w| !w.is_finite())
            {
                return Err(MlError::Load(format!(
                    "class `{}` has non-finite weights",
                    class.label
                )));
            }
            class.weights = class
                .weights
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect();
            classes.push(class);
        }

        let vocab = classes
            .iter()
            .flat_map(|c| c.weights.keys().cloned())
            .collect();

        Ok(Self {
            name: spec.name,
            classes,
            vocab,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, MlError> {
        let spec: TokenModelSpec =
            serde_json::from_str(json).map_err(|e| MlError::Load(e.to_string()))?;
        Self::from_spec(spec)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MlError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| MlError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&data)
    }

    /// Download a model file once at startup.
    pub async fn from_url(url: &str) -> Result<Self, MlError> {
        let http = reqwest::Client::builder()
            .user_agent("dm-intent-triage/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MlError::Load(e.to_string()))?;
        let resp = http
            .get(url)
            .send()
            .await
            .map_err(|e| MlError::Load(format!("GET {url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(MlError::Load(format!("GET {url}: HTTP {}", resp.status())));
        }
        let spec: TokenModelSpec = resp
            .json()
            .await
            .map_err(|e| MlError::Load(format!("GET {url}: {e}")))?;
        Self::from_spec(spec)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.label.as_str()).collect()
    }
}

impl TextClassifier for TokenModel {
    fn classify(&self, text: &str) -> Result<Prediction, MlError> {
        let tokens: Vec<String> = tokenize(text)
            .filter(|t| self.vocab.contains(t))
            .collect();
        // Nothing to go on; the prior alone is not a prediction.
        if tokens.is_empty() {
            return Err(MlError::Unavailable);
        }

        let logits: Vec<f32> = self
            .classes
            .iter()
            .map(|c| {
                c.prior.ln()
                    + tokens
                        .iter()
                        .map(|t| c.weights.get(t).copied().unwrap_or(c.default_weight))
                        .sum::<f32>()
            })
            .collect();

        let probs = softmax(&logits);
        let mut best = 0usize;
        for (i, p) in probs.iter().enumerate() {
            if *p > probs[best] {
                best = i;
            }
        }

        Ok(Prediction::new(self.classes[best].label.clone(), probs[best]))
    }

    fn name(&self) -> &'static str {
        "token-model"
    }
}

/// Lowercased tokens split on whitespace and ASCII punctuation. Sinhala
/// combining signs stay attached to their base letters.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
