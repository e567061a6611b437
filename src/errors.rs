use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Search backend failures. Degraded to an empty result set at the
/// pipeline boundary; never fatal to a request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search backend returned {0}")]
    Status(StatusCode),
    #[error("page fetch returned {0}")]
    FetchStatus(StatusCode),
}

/// Prompt store failures. Degraded to the fallback template at the
/// prompt-builder boundary.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt store is not configured")]
    Disabled,
    #[error("prompt request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("prompt store returned {0}")]
    Status(StatusCode),
    #[error("prompt payload has no body")]
    MissingBody,
}

/// Tracing backend failures. Scoring is best-effort telemetry; these are
/// logged and never affect the returned answer.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("tracing backend is not configured")]
    Disabled,
    #[error("trace request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("tracing backend returned {0}")]
    Status(StatusCode),
}

/// LLM completion failures. Fatal to the request on the generation path.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion backend returned {0}: {1}")]
    Status(StatusCode, String),
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
