//! HTTP surface: `GET /api/transcript` and `GET /health`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::transcript::{Transcript, TranscriptPipeline};
use crate::{ErrorCode, TranscriptError};

/// Shared application state passed to handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TranscriptPipeline>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub url: Option<String>,
}

/// Body of a successful transcript response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub error_code: Option<ErrorCode>,
    pub transcript: String,
    pub length: usize,
    pub preset: String,
    pub attempts: usize,
}

impl From<Transcript> for TranscriptResponse {
    fn from(transcript: Transcript) -> Self {
        Self {
            error_code: None,
            transcript: transcript.text,
            length: transcript.length,
            preset: transcript.preset,
            attempts: transcript.attempts,
        }
    }
}

/// Body of an error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&TranscriptError> for ErrorBody {
    fn from(error: &TranscriptError) -> Self {
        Self {
            error_code: error.code(),
            message: error.to_string(),
            details: error.details(),
        }
    }
}

/// HTTP status for each error code
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingUrl | ErrorCode::InvalidUrl => StatusCode::BAD_REQUEST,
        ErrorCode::YoutubeRateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::NoCaptions | ErrorCode::VideoUnavailable | ErrorCode::NoVttFile => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::YoutubeBotCheck => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::EmptyTranscript => StatusCode::BAD_GATEWAY,
        ErrorCode::YtdlpFailed | ErrorCode::FsError | ErrorCode::WorkerSetupFailed => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug)]
pub struct ApiError(pub TranscriptError);

impl From<TranscriptError> for ApiError {
    fn from(error: TranscriptError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from(&self.0);
        (status_for(body.error_code), Json(body)).into_response()
    }
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/transcript", get(transcript_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until Ctrl-C or SIGTERM
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "Transcript worker running on {}", local_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

async fn transcript_handler(
    State(state): State<AppState>,
    query: Result<Query<TranscriptQuery>, QueryRejection>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    // A query string that does not deserialize carries no usable `url`
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!("Rejected transcript query: {}", rejection.body_text());
        TranscriptError::MissingUrl
    })?;
    let transcript = state.pipeline.fetch_from_query(query.url.as_deref()).await?;
    Ok(Json(transcript.into()))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
