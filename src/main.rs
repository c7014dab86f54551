//! DM purchase-intent triage service: binary entrypoint.
//! Loads the catalog and optional ML models, then serves the Axum router.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dm_intent_triage::analyze::Analyzer;
use dm_intent_triage::api::{create_router, AppState};
use dm_intent_triage::catalog::CatalogStore;
use dm_intent_triage::devlog;
use dm_intent_triage::metrics::Metrics;
use dm_intent_triage::ml_bootstrap::MlRuntime;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - TRIAGE_DEV_LOG=1
fn enable_dev_tracing() {
    if !devlog::dev_logging_enabled() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triage=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env in local/dev; no-op in prod.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let catalog = CatalogStore::from_toml().context("failed to load product catalog")?;
    let ml = MlRuntime::from_env().await;
    let analyzer =
        Analyzer::new(Arc::new(catalog), ml.augmenter).context("failed to compile catalog")?;

    let mut router = create_router(AppState::new(analyzer));
    match Metrics::init() {
        Ok(metrics) => router = router.merge(metrics.router()),
        Err(e) => warn!(error = %e, "prometheus recorder not installed; /metrics disabled"),
    }

    Ok(router.into())
}
