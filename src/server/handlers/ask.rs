use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::server::handlers::cookie_value;
use crate::state::AppState;

const USER_ID_COOKIE: &str = "user_id";
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;

/// Answer text mentioning any of these reads as citing sources even when the
/// search stage returned nothing.
const CITATION_TERMS: [&str; 5] = ["source", "according to", "research", "found", "search"];

#[derive(Debug, Deserialize)]
pub struct AskPayload {
    #[serde(default)]
    pub question: String,
    /// Lenient: a non-numeric value is logged and ignored rather than
    /// rejected, matching the form's optional feedback field.
    #[serde(default)]
    pub toxicity: Option<String>,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(payload): Form<AskPayload>,
) -> Result<Response, ApiError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("No question provided".to_string()));
    }

    let toxicity = payload.toxicity.as_deref().and_then(|raw| {
        let parsed = raw.trim().parse::<f64>().ok();
        if parsed.is_none() {
            tracing::warn!("Invalid toxicity value provided, ignoring");
        }
        parsed
    });

    let outcome = state.pipeline.process_question(question, toxicity).await?;

    let has_citations = outcome.has_search_results || mentions_citations(&outcome.answer);
    let mut response = Json(json!({
        "answer": outcome.answer,
        "has_citations": has_citations,
    }))
    .into_response();

    if cookie_value(&headers, USER_ID_COOKIE).is_none() {
        let cookie = format!(
            "{}={}; Max-Age={}; Path=/",
            USER_ID_COOKIE,
            Uuid::new_v4(),
            COOKIE_MAX_AGE_SECS
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    Ok(response)
}

fn mentions_citations(answer: &str) -> bool {
    let answer = answer.to_lowercase();
    CITATION_TERMS.iter().any(|term| answer.contains(term))
}
