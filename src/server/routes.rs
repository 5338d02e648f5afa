//! HTTP handlers and router.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::state::AppState;

/// Body of a 412 for a missing comment.
pub const NO_COMMENT_MESSAGE: &str = "No comment provided";
/// Body of a 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred during processing";

/// Create the router with all endpoints.
///
/// Request bodies are not size-capped, so every request reaches a handler
/// and gets a JSON response.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// Why a request body could not be turned into a comment.
#[derive(Debug, PartialEq, Eq)]
enum BodyError {
    /// No usable comment: absent, `null`, or an empty/zero/false value.
    Missing,
    /// The body itself is unusable.
    Malformed(String),
}

/// Pull the comment out of a JSON body.
///
/// Any falsy `comment` (`""`, `false`, `0`, `[]`, `{}`, `null`) counts as
/// missing. A truthy value that is not a string is malformed.
fn extract_comment(body: &[u8]) -> Result<String, BodyError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|e| BodyError::Malformed(e.to_string()))?;
    let Value::Object(mut fields) = payload else {
        return Err(BodyError::Malformed("request body is not a JSON object".into()));
    };

    match fields.remove("comment") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(BodyError::Missing),
        Some(Value::String(s)) if s.is_empty() => Err(BodyError::Missing),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(BodyError::Missing),
        Some(Value::Array(a)) if a.is_empty() => Err(BodyError::Missing),
        Some(Value::Object(o)) if o.is_empty() => Err(BodyError::Missing),
        Some(other) => Err(BodyError::Malformed(format!(
            "comment must be a string, got {other}"
        ))),
    }
}

/// `POST /analyze`
///
/// 200 with the analysis, 412 for a missing comment or a rejected analysis,
/// 500 when the request itself cannot be processed.
pub async fn analyze_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    let comment = match extract_comment(&body) {
        Ok(comment) => comment,
        Err(BodyError::Missing) => {
            error!("No comment provided in the request");
            return error_response(StatusCode::PRECONDITION_FAILED, NO_COMMENT_MESSAGE);
        }
        Err(BodyError::Malformed(reason)) => {
            error!(error = %reason, "An unexpected error occurred");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE);
        }
    };

    match state.analyzer.analyze(&comment).await {
        Ok(analysis) => {
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            info!(
                comment = %comment,
                sentiment = %analysis.sentiment,
                topics = ?analysis.topic,
                elapsed_ms = format_args!("{elapsed_ms:.3}"),
                "Text analyzed"
            );
            (StatusCode::OK, Json(analysis)).into_response()
        }
        Err(err) => (StatusCode::PRECONDITION_FAILED, Json(err)).into_response(),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: String,
    git_sha: &'static str,
    git_dirty: bool,
}

/// `GET /health`
pub async fn health_handler() -> Json<impl Serialize> {
    let build = crate::version::build_info();
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
        git_sha: build.sha,
        git_dirty: build.dirty,
    })
}
