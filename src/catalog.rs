// src/catalog.rs
//! Catalog store: product aliases, topic keywords, sentiment lexicons,
//! urgency tiers, timeframe buckets, readiness phrases and segmentation
//! thresholds.
//!
//! Every list is an ordered record list; declaration order is the matching
//! priority. The catalog is loaded once at startup (`CATALOG_CONFIG_PATH`,
//! default `config/catalog.toml`) and shared read-only as `Arc<CatalogStore>`.
//! The same TOML is embedded in the binary as [`CatalogStore::builtin`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

// --- env defaults & names ---
pub const DEFAULT_CATALOG_PATH: &str = "config/catalog.toml";
pub const ENV_CATALOG_PATH: &str = "CATALOG_CONFIG_PATH";

/// Category reported for ad-context products no catalog alias recognizes.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

static BUILTIN_TOML: &str = include_str!("../config/catalog.toml");

static BUILTIN: Lazy<Arc<CatalogStore>> = Lazy::new(|| {
    Arc::new(CatalogStore::from_toml_str(BUILTIN_TOML).expect("embedded catalog is valid"))
});

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog section `{0}` is empty")]
    Empty(&'static str),
    #[error("catalog entry `{entry}` is invalid: {reason}")]
    Invalid { entry: String, reason: String },
    #[error("alias `{alias}` of `{model}` does not compile: {source}")]
    Pattern {
        model: String,
        alias: String,
        #[source]
        source: regex::Error,
    },
}

/// Topic urgency tier. Ordered so that `max()` gives the rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Low,
    Medium,
    High,
}

impl UrgencyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Low => "low",
            UrgencyTier::Medium => "medium",
            UrgencyTier::High => "high",
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AliasCatalogEntry {
    pub category: String,
    /// Canonical model name, lowercase.
    pub model: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TopicEntry {
    pub name: String,
    pub priority: u32,
    pub urgency: UrgencyTier,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SentimentLexicon {
    #[serde(default)]
    pub positive: Vec<WeightedTerm>,
    #[serde(default)]
    pub negative: Vec<WeightedTerm>,
    #[serde(default)]
    pub eagerness: Vec<String>,
    #[serde(default)]
    pub doubt: Vec<String>,
}

/// Urgency-modifier phrases. Scanned extreme -> high -> medium -> low.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UrgencyTiers {
    #[serde(default)]
    pub extreme: Vec<String>,
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

/// Timeframe buckets. Scanned in field order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TimeframeBuckets {
    #[serde(default)]
    pub today: Vec<String>,
    #[serde(default)]
    pub tomorrow: Vec<String>,
    #[serde(default)]
    pub this_weekend: Vec<String>,
    #[serde(default)]
    pub next_week: Vec<String>,
    #[serde(default)]
    pub this_month: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IntentPhrases {
    #[serde(default)]
    pub readiness: Vec<String>,
}

fn default_strong() -> f32 {
    0.8
}
fn default_moderate() -> f32 {
    0.6
}

/// Score thresholds used by the customer segmenter (strictly greater-than).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SegmentationThresholds {
    #[serde(default = "default_strong")]
    pub strong: f32,
    #[serde(default = "default_moderate")]
    pub moderate: f32,
}

impl Default for SegmentationThresholds {
    fn default() -> Self {
        Self {
            strong: default_strong(),
            moderate: default_moderate(),
        }
    }
}

/// Root of `config/catalog.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogStore {
    #[serde(default)]
    pub segmentation: SegmentationThresholds,
    #[serde(default)]
    pub sentiment: SentimentLexicon,
    #[serde(default)]
    pub urgency: UrgencyTiers,
    #[serde(default)]
    pub timeframes: TimeframeBuckets,
    #[serde(default)]
    pub intent: IntentPhrases,
    #[serde(default)]
    pub topics: Vec<TopicEntry>,
    #[serde(default)]
    pub products: Vec<AliasCatalogEntry>,
}

/// Section sizes, reported by `/debug/catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub categories: usize,
    pub models: usize,
    pub aliases: usize,
    pub topics: usize,
    pub positive_terms: usize,
    pub negative_terms: usize,
    pub urgency_phrases: usize,
    pub timeframe_phrases: usize,
    pub readiness_phrases: usize,
}

impl CatalogStore {
    /// Load from a TOML file. Uses CATALOG_CONFIG_PATH or defaults to "config/catalog.toml".
    pub fn from_toml() -> Result<Self, CatalogError> {
        let path = std::env::var(ENV_CATALOG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH));
        Self::from_path(path)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse, normalize phrases (trim + lowercase) and validate.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, CatalogError> {
        let mut store: CatalogStore = toml::from_str(toml_str)?;
        store.normalize();
        store.validate()?;
        Ok(store)
    }

    /// The catalog shipped inside the binary.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    fn normalize(&mut self) {
        fn list(v: &mut [String]) {
            for s in v.iter_mut() {
                *s = s.trim().to_lowercase();
            }
        }
        fn weighted(v: &mut [WeightedTerm]) {
            for t in v.iter_mut() {
                t.term = t.term.trim().to_lowercase();
            }
        }

        for p in &mut self.products {
            p.category = p.category.trim().to_string();
            p.model = p.model.trim().to_lowercase();
            list(&mut p.aliases);
        }
        for t in &mut self.topics {
            t.name = t.name.trim().to_string();
            list(&mut t.keywords);
        }
        weighted(&mut self.sentiment.positive);
        weighted(&mut self.sentiment.negative);
        list(&mut self.sentiment.eagerness);
        list(&mut self.sentiment.doubt);
        list(&mut self.urgency.extreme);
        list(&mut self.urgency.high);
        list(&mut self.urgency.medium);
        list(&mut self.urgency.low);
        list(&mut self.timeframes.today);
        list(&mut self.timeframes.tomorrow);
        list(&mut self.timeframes.this_weekend);
        list(&mut self.timeframes.next_week);
        list(&mut self.timeframes.this_month);
        list(&mut self.intent.readiness);
    }

    /// Structural checks. A blank phrase would match every message, so it is
    /// rejected rather than skipped.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.products.is_empty() {
            return Err(CatalogError::Empty("products"));
        }
        if self.topics.is_empty() {
            return Err(CatalogError::Empty("topics"));
        }
        if self.sentiment.positive.is_empty() && self.sentiment.negative.is_empty() {
            return Err(CatalogError::Empty("sentiment"));
        }
        if self.intent.readiness.is_empty() {
            return Err(CatalogError::Empty("intent.readiness"));
        }

        for p in &self.products {
            if p.model.is_empty() || p.category.is_empty() {
                return Err(invalid(&p.model, "model and category must be non-blank"));
            }
            if p.aliases.is_empty() {
                return Err(invalid(&p.model, "no aliases"));
            }
            if p.aliases.iter().any(String::is_empty) {
                return Err(invalid(&p.model, "blank alias"));
            }
        }

        for t in &self.topics {
            if t.name.is_empty() {
                return Err(invalid("<topic>", "blank topic name"));
            }
            if t.keywords.is_empty() || t.keywords.iter().any(String::is_empty) {
                return Err(invalid(&t.name, "missing or blank keyword"));
            }
        }

        for w in self
            .sentiment
            .positive
            .iter()
            .chain(self.sentiment.negative.iter())
        {
            if w.term.is_empty() {
                return Err(invalid("<sentiment>", "blank term"));
            }
            if !w.weight.is_finite() || w.weight < 0.0 {
                return Err(invalid(&w.term, "weight must be finite and non-negative"));
            }
        }

        let phrase_lists: [(&str, &Vec<String>); 12] = [
            ("sentiment.eagerness", &self.sentiment.eagerness),
            ("sentiment.doubt", &self.sentiment.doubt),
            ("urgency.extreme", &self.urgency.extreme),
            ("urgency.high", &self.urgency.high),
            ("urgency.medium", &self.urgency.medium),
            ("urgency.low", &self.urgency.low),
            ("timeframes.today", &self.timeframes.today),
            ("timeframes.tomorrow", &self.timeframes.tomorrow),
            ("timeframes.this_weekend", &self.timeframes.this_weekend),
            ("timeframes.next_week", &self.timeframes.next_week),
            ("timeframes.this_month", &self.timeframes.this_month),
            ("intent.readiness", &self.intent.readiness),
        ];
        for (section, phrases) in phrase_lists {
            if phrases.iter().any(String::is_empty) {
                return Err(invalid(section, "blank phrase"));
            }
        }

        let seg = self.segmentation;
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(seg.strong) || !in_unit(seg.moderate) || seg.moderate > seg.strong {
            return Err(invalid(
                "segmentation",
                "thresholds must satisfy 0 <= moderate <= strong <= 1",
            ));
        }

        Ok(())
    }

    /// Distinct category names in declaration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for p in &self.products {
            if !out.contains(&p.category.as_str()) {
                out.push(p.category.as_str());
            }
        }
        out
    }

    pub fn summary(&self) -> CatalogSummary {
        let tf = &self.timeframes;
        let ur = &self.urgency;
        CatalogSummary {
            categories: self.categories().len(),
            models: self.products.len(),
            aliases: self.products.iter().map(|p| p.aliases.len()).sum(),
            topics: self.topics.len(),
            positive_terms: self.sentiment.positive.len(),
            negative_terms: self.sentiment.negative.len(),
            urgency_phrases: ur.extreme.len() + ur.high.len() + ur.medium.len() + ur.low.len(),
            timeframe_phrases: tf.today.len()
                + tf.tomorrow.len()
                + tf.this_weekend.len()
                + tf.next_week.len()
                + tf.this_month.len(),
            readiness_phrases: self.intent.readiness.len(),
        }
    }
}

fn invalid(entry: &str, reason: &str) -> CatalogError {
    CatalogError::Invalid {
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}
