// src/api.rs
//! HTTP surface: health, client listing, analysis, top-N ranking and uploads.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::analyze::{self, AnalysisResult, Analyzer};
use crate::config::{InsightsConfig, RankingConfig};
use crate::dataset::{ClientRecord, DatasetHandle, ReplaceOutcome};
use crate::error::{ParseError, ValidationError};
use crate::ingest::{fingerprint, table_from_csv, table_from_json, Table};
use crate::metrics::{record_analyze, record_upload};
use crate::sentiment::LexiconPolarity;

#[derive(Clone)]
pub struct AppState {
    pub dataset: DatasetHandle,
    pub analyzer: Arc<Analyzer>,
    pub ranking: RankingConfig,
}

impl AppState {
    pub fn new(dataset: DatasetHandle, analyzer: Analyzer, ranking: RankingConfig) -> Self {
        Self {
            dataset,
            analyzer: Arc::new(analyzer),
            ranking,
        }
    }

    /// Lexicon sentiment, dataset seeded per `cfg.dataset.seed_sample`.
    pub fn from_config(cfg: &InsightsConfig) -> Self {
        let dataset = if cfg.dataset.seed_sample {
            DatasetHandle::with_sample()
        } else {
            DatasetHandle::default()
        };
        let analyzer = Analyzer::with_config(Arc::new(LexiconPolarity::new()), cfg);
        Self::new(dataset, analyzer, cfg.ranking)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/clients", get(list_clients))
        .route("/analyze", get(analyze_all))
        .route("/analyze/top", get(analyze_top))
        .route("/upload", post(upload))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Error body is always `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Parse(ParseError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        ApiError::Parse(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Parse(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(serde::Serialize)]
struct ClientsOut {
    version: u64,
    clients: Vec<ClientRecord>,
}

async fn list_clients(State(state): State<AppState>) -> Json<ClientsOut> {
    let snap = state.dataset.list_clients();
    Json(ClientsOut {
        version: snap.version,
        clients: snap.clients.clone(),
    })
}

async fn analyze_all(State(state): State<AppState>) -> Result<Json<Vec<AnalysisResult>>, ApiError> {
    record_analyze("analyze");
    let snap = state.dataset.list_clients();
    let results = state.analyzer.analyze_all(&snap.clients, today()).map_err(|e| {
        warn!(version = snap.version, error = %e, "analysis pass aborted");
        e
    })?;
    Ok(Json(results))
}

#[derive(serde::Deserialize)]
struct TopQuery {
    by: Option<String>,
    n: Option<String>,
}

async fn analyze_top(
    State(state): State<AppState>,
    Query(q): Query<TopQuery>,
) -> Result<Json<Vec<AnalysisResult>>, ApiError> {
    record_analyze("top");
    let (metric, n) =
        analyze::parse_top_params(q.by.as_deref(), q.n.as_deref(), state.ranking.default_n)?;

    let snap = state.dataset.list_clients();
    let results = state.analyzer.analyze_all(&snap.clients, today())?;
    Ok(Json(analyze::top(results, metric, n)))
}

#[derive(serde::Serialize)]
struct UploadResp {
    message: &'static str,
    #[serde(flatten)]
    outcome: ReplaceOutcome,
}

/// `multipart/form-data` with a `file` part holding CSV, or a JSON array of records.
async fn upload(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<UploadResp>, ApiError> {
    let result = receive_table(req).await.and_then(|(table, digest)| {
        let rows = table.len();
        state
            .dataset
            .replace_dataset(table)
            .map(|outcome| (outcome, digest, rows))
    });

    match result {
        Ok((outcome, digest, rows)) => {
            record_upload("accepted");
            info!(
                version = outcome.version,
                rows,
                fingerprint = %digest,
                "upload accepted"
            );
            Ok(Json(UploadResp {
                message: "File uploaded successfully",
                outcome,
            }))
        }
        Err(e) => {
            record_upload("rejected");
            warn!(error = %e, "upload rejected");
            Err(e.into())
        }
    }
}

async fn receive_table(req: Request) -> Result<(Table, String), ValidationError> {
    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("application/json"));

    if is_json {
        let bytes = Bytes::from_request(req, &())
            .await
            .map_err(|e| ValidationError::MalformedUpload(e.body_text()))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ValidationError::MalformedUpload(e.to_string()))?;
        return Ok((table_from_json(value)?, fingerprint(&bytes)));
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|_| ValidationError::MissingFilePart)?;
    let bytes = read_file_part(&mut multipart).await?;
    Ok((table_from_csv(bytes.as_ref())?, fingerprint(&bytes)))
}

/// Bytes of the `file` part. A `file` field without a filename is not a file.
async fn read_file_part(multipart: &mut Multipart) -> Result<Bytes, ValidationError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidationError::MalformedUpload(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        match field.file_name() {
            None => continue,
            Some("") => return Err(ValidationError::EmptyFilename),
            Some(_) => {}
        }
        return field
            .bytes()
            .await
            .map_err(|e| ValidationError::MalformedUpload(e.body_text()));
    }
    Err(ValidationError::MissingFilePart)
}
