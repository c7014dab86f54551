// src/config/ml.rs
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_ML_CONFIG_PATH: &str = "config/ml.json";
pub const ENV_ML_CONFIG_PATH: &str = "ML_CONFIG_PATH";
/// `ML_TEST_MODE=mock` swaps in deterministic classifiers.
pub const ENV_ML_TEST_MODE: &str = "ML_TEST_MODE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlConfig {
    pub enabled: bool,
    /// File path or http(s) URL of the product-category model.
    #[serde(default)]
    pub category_model: Option<String>,
    /// File path or http(s) URL of the polarity model.
    #[serde(default)]
    pub polarity_model: Option<String>,
}

/// Where a model file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLocation {
    File(PathBuf),
    Url(String),
}

impl ModelLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ModelLocation::Url(raw.to_string())
        } else {
            ModelLocation::File(PathBuf::from(raw))
        }
    }
}

impl MlConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: MlConfig = serde_json::from_str(&data)?;

        // Blank locations mean "not configured"
        for loc in [&mut cfg.category_model, &mut cfg.polarity_model] {
            if loc.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *loc = None;
            }
        }

        Ok(cfg)
    }

    /// ML_CONFIG_PATH or "config/ml.json". A missing or unreadable file
    /// means ML is off; it is never fatal.
    pub fn from_env_or_default() -> Self {
        let path = std::env::var(ENV_ML_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ML_CONFIG_PATH));
        match Self::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "ml config not loaded; ml disabled");
                Self::default()
            }
        }
    }

    pub fn category_location(&self) -> Option<ModelLocation> {
        self.category_model.as_deref().map(ModelLocation::parse)
    }

    pub fn polarity_location(&self) -> Option<ModelLocation> {
        self.polarity_model.as_deref().map(ModelLocation::parse)
    }
}

pub fn mock_mode() -> bool {
    std::env::var(ENV_ML_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
}
