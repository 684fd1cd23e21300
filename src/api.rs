// src/api.rs
// HTTP surface: submit a briefing, fetch the rendered audio, health, and
// nothing else. Failures cross this boundary only as tagged, readable JSON.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::error::BriefingError;
use crate::orchestrator::{BriefingOutcome, Orchestrator};
use crate::request::BriefingRequest;
use crate::speech::store::AudioStore;
use crate::speech::AudioArtifact;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
    pub store: AudioStore,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        let store = AudioStore::new(&config.server.audio_dir);
        let orchestrator = Arc::new(Orchestrator::from_config(&config, store.clone()));
        Self {
            config: Arc::new(config),
            orchestrator,
            store,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/briefings", post(submit_briefing))
        .route("/audio/{id}", get(get_audio))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error_kind: &'static str,
    message: String,
}

impl IntoResponse for BriefingError {
    fn into_response(self) -> Response {
        let status = match self {
            BriefingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BriefingError::Connector(_)
            | BriefingError::Summarize(_)
            | BriefingError::Render(_) => StatusCode::BAD_GATEWAY,
            BriefingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error_kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(serde::Serialize)]
struct BriefingResponse {
    status: &'static str,
    message: String,
    audio_url: Option<String>,
    artifact: Option<AudioArtifact>,
}

async fn submit_briefing(
    State(state): State<AppState>,
    Json(request): Json<BriefingRequest>,
) -> Result<Json<BriefingResponse>, BriefingError> {
    match state.orchestrator.run(request).await? {
        BriefingOutcome::Rendered(artifact) => Ok(Json(BriefingResponse {
            status: "done",
            message: "briefing rendered".into(),
            audio_url: Some(format!("/audio/{}", artifact.id)),
            artifact: Some(artifact),
        })),
        BriefingOutcome::NoContent => Ok(Json(BriefingResponse {
            status: "no_content",
            message: "no matching content was found for the requested topics".into(),
            audio_url: None,
            artifact: None,
        })),
    }
}

async fn get_audio(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.read(&id) {
        Ok(Some(bytes)) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"briefing.mp3\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error_kind: "not_found",
                message: format!("no audio artifact with id {id}"),
            }),
        )
            .into_response(),
        Err(e) => BriefingError::Storage(e.to_string()).into_response(),
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    features: Vec<&'static str>,
}

/// Readiness probe that also reports which providers are configured; the
/// RSS fallbacks keep the service usable without any credentials, but a
/// missing LLM key means scripts cannot be written.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let features = state.config.configured_features();
    let status = if state.config.llm.api_key.is_empty() {
        "degraded"
    } else {
        "healthy"
    };
    Json(HealthResponse { status, features })
}
