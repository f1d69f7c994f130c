//! HTTP API surface.
//!
//! API endpoints:
//! - POST /api/identify       - multipart image, identify a poster
//! - POST /api/ingest         - multipart image + title, add to the dataset
//! - POST /api/verify         - multipart image + key, self-match check
//! - GET  /api/stats          - index health snapshot
//! - GET  /api/trending       - trending anime metadata
//! - POST /api/youtube-search - resolve a query to a video id
//! - GET  /api/health         - liveness probe

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use animikyoku_catalog::Provenance;
use animikyoku_engine::{Engine, EngineError, Identification, IdentifyOptions, IngestRequest};

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
    anilist: Arc<animikyoku_anilist::Client>,
    gemini: Option<Arc<animikyoku_gemini::Client>>,
}

pub async fn serve(
    addr: &str,
    engine: Arc<Engine>,
    anilist: Arc<animikyoku_anilist::Client>,
    gemini: Option<Arc<animikyoku_gemini::Client>>,
) -> Result<()> {
    let state = AppState {
        engine,
        anilist,
        gemini,
    };

    let app = Router::new()
        .route("/api/identify", post(identify))
        .route("/api/ingest", post(ingest))
        .route("/api/verify", post(verify))
        .route("/api/stats", get(stats))
        .route("/api/trending", get(trending))
        .route("/api/youtube-search", post(youtube_search))
        .route("/api/health", get(health))
        .with_state(state);

    let addr: SocketAddr = addr.parse()?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Engine errors mapped onto HTTP statuses.
struct ApiError(StatusCode, String);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match &e {
            EngineError::InvalidImage(_) | EngineError::Contract(_) => StatusCode::BAD_REQUEST,
            EngineError::Metadata(_) => StatusCode::NOT_FOUND,
            EngineError::Embed(_) | EngineError::Fallback(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

fn bad_request(msg: &str) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, msg.to_string())
}

/// Multipart form shared by the upload endpoints.
#[derive(Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    title: Option<String>,
    key: Option<String>,
    season: Option<u32>,
    notes: Option<String>,
    source: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("failed to read image field: {e}")))?;
                form.image = Some(bytes.to_vec());
            }
            "title" => form.title = Some(read_text(field).await?),
            "key" => form.key = Some(read_text(field).await?),
            "season" => {
                let text = read_text(field).await?;
                form.season =
                    Some(text.parse().map_err(|_| bad_request("season must be a number"))?);
            }
            "notes" => form.notes = Some(read_text(field).await?),
            "source" => form.source = Some(read_text(field).await?),
            _ => {}
        }
    }
    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| bad_request(&format!("failed to read field: {e}")))
}

fn parse_provenance(s: &str) -> Result<Provenance, ApiError> {
    match s {
        "manual" => Ok(Provenance::Manual),
        "user_correction" => Ok(Provenance::UserCorrection),
        "fallback_confirmed" => Ok(Provenance::FallbackConfirmed),
        "rebuild" => Ok(Provenance::Rebuild),
        other => Err(bad_request(&format!("unknown source: {other}"))),
    }
}

#[derive(Debug, Deserialize)]
struct IdentifyParams {
    #[serde(default)]
    force_index_only: bool,
    threshold: Option<f32>,
}

async fn identify(
    State(state): State<AppState>,
    Query(params): Query<IdentifyParams>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_form(multipart).await?;
    let image = form.image.ok_or_else(|| bad_request("missing image field"))?;

    let mut opts = IdentifyOptions {
        index_only: params.force_index_only,
        ..Default::default()
    };
    if let Some(threshold) = params.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(bad_request("threshold must be in [0, 1]"));
        }
        opts.threshold = threshold;
    }

    let report = state.engine.identify(&image, opts).await?;
    // Unidentified outcomes keep the diagnostic payload but signal
    // failure in the status line.
    let status = match &report.identification {
        Identification::NotRecognized { .. } => StatusCode::BAD_REQUEST,
        Identification::NoMatch { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    Ok((status, Json(report)).into_response())
}

async fn ingest(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let image = form.image.ok_or_else(|| bad_request("missing image field"))?;
    let title = form.title.ok_or_else(|| bad_request("missing title field"))?;

    let source = match form.source.as_deref() {
        Some(s) => parse_provenance(s)?,
        None => Provenance::Manual,
    };

    let mut request = IngestRequest::new(image, title, source);
    request.season = form.season;
    request.notes = form.notes.unwrap_or_default();

    let receipt = state.engine.ingest(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn verify(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let image = form.image.ok_or_else(|| bad_request("missing image field"))?;
    let key = form.key.ok_or_else(|| bad_request("missing key field"))?;

    let report = state.engine.verify(&image, &key).await?;
    Ok(Json(report))
}

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.stats().await)
}

async fn trending(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.anilist.fetch_trending().await)
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    q: String,
}

#[derive(Debug, Serialize)]
struct VideoResult {
    video_id: Option<String>,
}

async fn youtube_search(
    State(state): State<AppState>,
    Json(params): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gemini = state.gemini.as_ref().ok_or(ApiError(
        StatusCode::SERVICE_UNAVAILABLE,
        "video search requires the vision backend".to_string(),
    ))?;
    let video_id = gemini
        .find_video_id(&params.q)
        .await
        .map_err(|e| ApiError(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(VideoResult { video_id }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
