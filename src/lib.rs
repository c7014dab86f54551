// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod catalog;
pub mod config;
pub mod devlog;
pub mod ingest;
pub mod metrics;
pub mod ml_bootstrap;
pub mod report;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisRecord, Analyzer, MessageInput};
pub use crate::api::{create_router, AppState};
pub use crate::catalog::{CatalogError, CatalogStore};
pub use crate::ml_bootstrap::MlRuntime;
