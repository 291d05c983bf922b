//! CRM Relationship Insights — Binary Entrypoint
//! Boots the Axum HTTP server, wiring config, shared state, metrics and routes.

use crm_relationship_insights::{api, config::InsightsConfig, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines with LOG_FORMAT=json.
/// Uses `try_init` so an already-installed subscriber is kept.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crm_relationship_insights=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = InsightsConfig::load_default()?;
    let state = api::AppState::from_config(&cfg);
    info!(
        clients = state.dataset.list_clients().clients.len(),
        on_invalid_row = ?cfg.analysis.on_invalid_row,
        "dataset initialized"
    );

    let metrics = Metrics::init()?;
    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}
