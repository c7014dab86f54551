// src/ml_bootstrap.rs
//! Startup wiring for optional ML augmentation. Loading never fails: a
//! capability whose model cannot be loaded stays disabled for the process
//! lifetime.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analyze::ml_adapter::{
    DisabledClassifier, DynClassifier, MlAugmenter, MlError, MockClassifier, Prediction,
};
use crate::analyze::token_model::TokenModel;
use crate::config::ml::{mock_mode, MlConfig, ModelLocation};

pub struct MlRuntime {
    pub cfg: MlConfig,
    pub augmenter: MlAugmenter,
}

impl MlRuntime {
    /// ML_CONFIG_PATH (or config/ml.json), then [`MlRuntime::load`].
    pub async fn from_env() -> Self {
        Self::load(MlConfig::from_env_or_default()).await
    }

    pub async fn load(cfg: MlConfig) -> Self {
        if mock_mode() {
            info!("ML_TEST_MODE=mock: deterministic classifiers installed");
            return Self {
                cfg,
                augmenter: mock_augmenter(),
            };
        }

        if !cfg.enabled {
            info!("ml augmentation disabled in config");
            return Self {
                cfg,
                augmenter: MlAugmenter::disabled(),
            };
        }

        let category = load_capability("category", cfg.category_location()).await;
        let polarity = load_capability("polarity", cfg.polarity_location()).await;
        Self {
            cfg,
            augmenter: MlAugmenter::new(category, polarity),
        }
    }
}

pub fn mock_augmenter() -> MlAugmenter {
    MlAugmenter::new(
        Arc::new(MockClassifier {
            fixed: Prediction::new("iPhone", 0.9),
        }),
        Arc::new(MockClassifier {
            fixed: Prediction::new("positive", 0.8),
        }),
    )
}

async fn load_capability(capability: &'static str, location: Option<ModelLocation>) -> DynClassifier {
    let Some(location) = location else {
        info!(capability, "no model configured");
        return Arc::new(DisabledClassifier);
    };

    match load_model(&location).await {
        Ok(model) => {
            info!(
                capability,
                model = model.model_name().unwrap_or("unnamed"),
                classes = model.labels().len(),
                "ml model loaded"
            );
            Arc::new(model)
        }
        Err(e) => {
            warn!(capability, location = ?location, error = %e, "ml model load failed; capability disabled");
            Arc::new(DisabledClassifier)
        }
    }
}

async fn load_model(location: &ModelLocation) -> Result<TokenModel, MlError> {
    match location {
        ModelLocation::File(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || TokenModel::from_path(path))
                .await
                .map_err(|e| MlError::Load(e.to_string()))?
        }
        ModelLocation::Url(url) => TokenModel::from_url(url).await,
    }
}
