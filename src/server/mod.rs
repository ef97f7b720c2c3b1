//! HTTP server and web UI
//!
//! Serves the single-page interface plus the small JSON API it calls. Engine
//! work is blocking, so every handler that touches the engine hops onto the
//! blocking pool.

use crate::catalog;
use crate::config::Config;
use crate::engine::TtsEngine;
use crate::synthesis::{Orchestrator, SynthesisRequest};
use crate::{Result, TtsRunnerError};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;
use tower_http::cors::{Any, CorsLayer};

/// The embedded single-page UI
const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<dyn TtsEngine>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the application router
pub fn build_router(config: Arc<Config>, engine: Arc<dyn TtsEngine>) -> Router {
    let orchestrator = Arc::new(Orchestrator::new(config.clone(), engine.clone()));
    let state = AppState {
        config,
        engine,
        orchestrator,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/models", get(list_models))
        .route("/api/models/:model/speakers", get(list_speakers))
        .route("/api/synthesize", post(synthesize))
        .route("/audio/:filename", get(serve_audio))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn run_server(config: Arc<Config>, engine: Arc<dyn TtsEngine>) -> Result<()> {
    let addr = format!("{}:{}", config.bind_host(), config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        TtsRunnerError::Other(format!(
            "Failed to bind {} (set SERVER_PORT to a free port): {}",
            addr, e
        ))
    })?;
    info!("Web server listening at http://{}", addr);

    let app = build_router(config, engine);
    axum::serve(listener, app)
        .await
        .map_err(|e| TtsRunnerError::Other(format!("HTTP server error: {}", e)))
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "engine": state.engine.name(),
        "version": crate::VERSION,
    }))
}

#[derive(Serialize)]
struct ModelsResponse {
    models: Vec<String>,
    default_model: String,
}

async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.engine.clone();
    let config = state.config.clone();

    let result = task::spawn_blocking(move || {
        let models = catalog::list_available_models(engine.as_ref(), &config);
        let default_model = pick_default_model(&models, &config);
        ModelsResponse {
            models,
            default_model,
        }
    })
    .await;

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => internal_error(format!("model listing task failed: {}", e)),
    }
}

async fn list_speakers(
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> impl IntoResponse {
    let engine = state.engine.clone();

    let result =
        task::spawn_blocking(move || catalog::get_speaker_ids(engine.as_ref(), &model)).await;

    match result {
        Ok(speakers) => Json(serde_json::json!({ "speakers": speakers })).into_response(),
        Err(e) => internal_error(format!("speaker listing task failed: {}", e)),
    }
}

#[derive(Deserialize)]
struct SynthesizeBody {
    text: String,
    model: String,
    #[serde(default)]
    speaker_id: Option<usize>,
    #[serde(default)]
    speed: Option<f32>,
}

#[derive(Serialize)]
struct SynthesizeResponse {
    audio: String,
    message: String,
}

async fn synthesize(
    State(state): State<AppState>,
    Json(body): Json<SynthesizeBody>,
) -> impl IntoResponse {
    let orchestrator = state.orchestrator.clone();
    let request = SynthesisRequest {
        text: body.text,
        model: body.model,
        speaker_id: body.speaker_id,
        speed: body.speed.unwrap_or(1.0),
    };

    let result = task::spawn_blocking(move || orchestrator.text_to_speech(&request)).await;

    match result {
        Ok(Ok(output)) => {
            let filename = output
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Json(SynthesizeResponse {
                audio: format!("/audio/{}", filename),
                message: output.message,
            })
            .into_response()
        }
        Ok(Err(TtsRunnerError::Validation(message))) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Error generating speech: {}", e)
            })),
        )
            .into_response(),
        Err(e) => internal_error(format!("synthesis task failed: {}", e)),
    }
}

/// Serve a generated WAV from the output directory
///
/// Only bare filenames are accepted; anything that could climb out of the
/// output directory is rejected.
async fn serve_audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    if !is_safe_audio_filename(&filename) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "invalid filename" })),
        )
            .into_response();
    }

    let path = state.config.output_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "audio file not found" })),
        )
            .into_response(),
    }
}

/// Initial dropdown selection: the configured default when it is actually
/// installed, otherwise the first catalog entry
fn pick_default_model(models: &[String], config: &Config) -> String {
    if models.contains(&config.default_model) {
        config.default_model.clone()
    } else {
        models
            .first()
            .cloned()
            .unwrap_or_else(|| config.default_model.clone())
    }
}

/// Accept only bare filenames; anything that could climb out of the output
/// directory is rejected
fn is_safe_audio_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

fn internal_error(message: String) -> axum::response::Response {
    error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_filename_guard_rejects_traversal() {
        assert!(!is_safe_audio_filename("../secrets.wav"));
        assert!(!is_safe_audio_filename("..\\..\\out.wav"));
        assert!(!is_safe_audio_filename("a..b.wav"));
        assert!(!is_safe_audio_filename("dir/file.wav"));
        assert!(!is_safe_audio_filename("dir\\file.wav"));
        assert!(!is_safe_audio_filename("/etc/passwd"));
        assert!(!is_safe_audio_filename(""));
    }

    #[test]
    fn audio_filename_guard_accepts_generated_names() {
        assert!(is_safe_audio_filename("20260829_120000_Hello_World.wav"));
        assert!(is_safe_audio_filename("20260829_120000_.wav"));
    }

    #[test]
    fn default_model_selection_never_panics() {
        let config = Config::from_lookup(|_| None).unwrap();

        let installed = vec!["en_US-amy".to_string(), config.default_model.clone()];
        assert_eq!(pick_default_model(&installed, &config), config.default_model);

        let other = vec!["en_US-amy".to_string()];
        assert_eq!(pick_default_model(&other, &config), "en_US-amy");

        let empty: Vec<String> = Vec::new();
        assert_eq!(pick_default_model(&empty, &config), config.default_model);
    }
}
