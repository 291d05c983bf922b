// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisResult, Analyzer, Flag, Metric, RowFailurePolicy};
pub use crate::api::{create_router, AppState};
pub use crate::config::InsightsConfig;
pub use crate::dataset::{ClientRecord, Dataset, DatasetHandle};
pub use crate::error::{ParseError, ValidationError};
pub use crate::sentiment::{LexiconPolarity, PolarityProvider};

/// Build the service router from config (no metrics recorder installed).
pub fn app(cfg: &InsightsConfig) -> axum::Router {
    create_router(AppState::from_config(cfg))
}
