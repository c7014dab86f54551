// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::analyze::{AnalysisRecord, Analyzer, MessageInput};
use crate::catalog::CatalogSummary;
use crate::ingest::{self, InboundRecord};
use crate::report::{self, BatchSummary};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(batch))
        .route("/debug/catalog", get(debug_catalog))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn analyze(
    State(state): State<AppState>,
    Json(input): Json<MessageInput>,
) -> Json<AnalysisRecord> {
    Json(state.analyzer.analyze(&input))
}

#[derive(Debug, Serialize)]
struct BatchResp {
    date: NaiveDate,
    results: Vec<AnalysisRecord>,
    summary: BatchSummary,
}

/// Analyze the pending rows of an inbox export and summarize them.
async fn batch(
    State(state): State<AppState>,
    Json(rows): Json<Vec<InboundRecord>>,
) -> Json<BatchResp> {
    let date = Utc::now().date_naive();
    let inputs = ingest::pending(&rows);
    let results = state.analyzer.analyze_many(&inputs);
    let summary = report::summarize(date, &results);
    Json(BatchResp {
        date,
        results,
        summary,
    })
}

#[derive(Debug, Serialize)]
struct MlInfo {
    category_enabled: bool,
    category_provider: &'static str,
    polarity_enabled: bool,
    polarity_provider: &'static str,
}

#[derive(Debug, Serialize)]
struct CatalogInfo {
    catalog: CatalogSummary,
    ml: MlInfo,
}

async fn debug_catalog(State(state): State<AppState>) -> Json<CatalogInfo> {
    let ml = state.analyzer.ml();
    Json(CatalogInfo {
        catalog: state.analyzer.catalog().summary(),
        ml: MlInfo {
            category_enabled: ml.category_enabled(),
            category_provider: ml.category_provider(),
            polarity_enabled: ml.polarity_enabled(),
            polarity_provider: ml.polarity_provider(),
        },
    })
}
