// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the triage metrics.
    /// Fails if a recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!("triage_messages_total", "Messages analyzed");
        describe_counter!(
            "triage_intent_tier_total",
            "Analyzed messages by intent tier"
        );
        describe_histogram!(
            "triage_analyze_ms",
            Unit::Milliseconds,
            "Per-message analysis latency"
        );
        describe_counter!(
            "triage_ml_fallback_total",
            "Model calls that failed and fell back to keyword results"
        );
        describe_counter!(
            "triage_ingest_skipped_total",
            "Pending inbound rows skipped for blank text"
        );

        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
