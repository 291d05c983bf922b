use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const ANALYZE_REQUESTS: &str = "crm_analyze_requests_total";
pub const UPLOADS: &str = "crm_uploads_total";
pub const DATASET_CLIENTS: &str = "crm_dataset_clients";
pub const DATASET_VERSION: &str = "crm_dataset_version";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder. Call once, from the binary.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(ANALYZE_REQUESTS, "Analysis requests served, by endpoint");
        describe_counter!(UPLOADS, "Dataset uploads, by outcome");
        describe_gauge!(DATASET_CLIENTS, "Client records in the current dataset");
        describe_gauge!(DATASET_VERSION, "Version of the current dataset");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
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

pub(crate) fn record_analyze(endpoint: &'static str) {
    counter!(ANALYZE_REQUESTS, "endpoint" => endpoint).increment(1);
}

pub(crate) fn record_upload(outcome: &'static str) {
    counter!(UPLOADS, "outcome" => outcome).increment(1);
}
