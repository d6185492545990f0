//! REST endpoints consumed by the practice UI
//!
//! Provides:
//! - Problem generation (AI) and the built-in default problem
//! - Interview feedback generation (AI)
//! - Audio transcription (AI)
//! - Sandboxed execution of user submissions
//! - Per-language starter templates
//!
//! Every AI failure maps to a JSON error envelope the UI can show as a
//! notification; nothing here panics the process.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::gemini::GeminiClient;
use crate::problem::{Difficulty, ProblemSpec};
use crate::sandbox::{CodeExecutor, ExecutionOutcome, Language};

/// Inline audio uploads are the largest request bodies we accept.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SHARED STATE
// ============================================================================

/// State shared across all handlers.
pub struct AppState {
    pub gemini: GeminiClient,
    pub executor: Box<dyn CodeExecutor>,
}

/// JSON error envelope shown by the UI.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

type ApiFailure = (StatusCode, Json<ErrorResponse>);

fn failure(status: StatusCode, error: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
}

fn upstream_failure(err: ApiError) -> ApiFailure {
    let status = match err {
        ApiError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    failure(status, err.to_string())
}

// ============================================================================
// PROBLEM ENDPOINTS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateProblemRequest {
    pub difficulty: Difficulty,
}

/// POST /api/v1/problem - Generate a fresh problem at the requested
/// difficulty.
pub async fn generate_problem(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateProblemRequest>,
) -> Result<Json<ProblemSpec>, ApiFailure> {
    match state.gemini.generate_problem(req.difficulty).await {
        Ok(problem) => {
            info!(difficulty = %req.difficulty, title = %problem.title, "Problem generated");
            Ok(Json(problem))
        }
        Err(e) => {
            warn!("Problem generation failed: {}", e);
            Err(upstream_failure(e))
        }
    }
}

/// GET /api/v1/problem/default - The built-in problem shown before any
/// generation.
pub async fn default_problem() -> Json<ProblemSpec> {
    Json(ProblemSpec::default_problem())
}

// ============================================================================
// FEEDBACK ENDPOINT
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

/// POST /api/v1/feedback - Generate interview feedback on an answer.
pub async fn generate_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiFailure> {
    if req.answer.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Answer is empty"));
    }

    match state.gemini.generate_feedback(&req.question, &req.answer).await {
        Ok(feedback) => Ok(Json(FeedbackResponse { feedback })),
        Err(e) => {
            warn!("Feedback generation failed: {}", e);
            Err(upstream_failure(e))
        }
    }
}

// ============================================================================
// TRANSCRIPTION ENDPOINT
// ============================================================================

fn default_mime_type() -> String {
    "audio/wav".to_string()
}

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    pub audio_base64: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// POST /api/v1/transcribe - Transcribe recorded audio.
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, ApiFailure> {
    let audio = BASE64
        .decode(req.audio_base64.as_bytes())
        .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("Invalid base64 audio: {e}")))?;

    if audio.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Audio payload is empty"));
    }

    match state.gemini.transcribe(&audio, &req.mime_type).await {
        Ok(text) => Ok(Json(TranscribeResponse { text })),
        Err(e) => {
            warn!("Transcription failed: {}", e);
            Err(upstream_failure(e))
        }
    }
}

// ============================================================================
// EXECUTION ENDPOINTS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub language: Language,
    pub code: String,
}

/// POST /api/v1/execute - Run a submission in the sandbox.
pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecutionOutcome>, ApiFailure> {
    if req.code.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "No code to run"));
    }

    match state.executor.execute(req.language, &req.code).await {
        Ok(outcome) => {
            info!(
                language = %req.language,
                exit_code = outcome.exit_code,
                duration_ms = outcome.duration_ms,
                timed_out = outcome.timed_out,
                "Submission executed"
            );
            Ok(Json(outcome))
        }
        Err(e) => {
            warn!("Sandbox execution failed: {}", e);
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Execution failed: {e}"),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub language: Language,
    pub template: String,
}

/// GET /api/v1/template/:language - Starter code for the editor.
pub async fn starter_template(
    Path(language): Path<String>,
) -> Result<Json<TemplateResponse>, ApiFailure> {
    let language = Language::parse(&language)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, format!("Unknown language: {language}")))?;

    Ok(Json(TemplateResponse {
        language,
        template: language.starter_template().to_string(),
    }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/problem", post(generate_problem))
        .route("/api/v1/problem/default", get(default_problem))
        .route("/api/v1/feedback", post(generate_feedback))
        .route("/api/v1/transcribe", post(transcribe))
        .route("/api/v1/execute", post(execute_code))
        .route("/api/v1/template/:language", get(starter_template))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
