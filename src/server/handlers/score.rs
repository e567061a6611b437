use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::server::extract::JsonOrForm;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScorePayload {
    #[serde(default)]
    pub question: Option<String>,
    /// JSON bodies carry a number, form bodies a string; both are accepted.
    #[serde(default)]
    pub toxicity: Option<Value>,
}

/// Attach an expert toxicity score to a previous answer by re-running the
/// question with the score supplied. Validation happens here, before the
/// pipeline is invoked.
pub async fn score(
    State(state): State<Arc<AppState>>,
    JsonOrForm(payload): JsonOrForm<ScorePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let question = payload
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Question is required".to_string()))?
        .to_string();

    let toxicity = payload
        .toxicity
        .ok_or_else(|| ApiError::BadRequest("Toxicity score is required".to_string()))?;
    let toxicity = validate_toxicity(&toxicity)?;

    state
        .pipeline
        .process_question(&question, Some(toxicity))
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Expert feedback score of {} received and applied. \
Automated toxicity evaluation also performed.",
            toxicity
        ),
    })))
}

fn validate_toxicity(raw: &Value) -> Result<f64, ApiError> {
    let value = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ApiError::BadRequest("Toxicity must be a number between 0 and 1".to_string())
    })?;

    if !(0.0..=1.0).contains(&value) {
        return Err(ApiError::BadRequest(
            "Toxicity must be between 0 and 1".to_string(),
        ));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_toxicity_is_rejected() {
        let err = validate_toxicity(&json!("abc")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn out_of_range_toxicity_is_rejected() {
        assert!(validate_toxicity(&json!(1.5)).is_err());
        assert!(validate_toxicity(&json!(-0.1)).is_err());
    }

    #[test]
    fn numeric_and_string_values_both_parse() {
        assert_eq!(validate_toxicity(&json!(0.4)).unwrap(), 0.4);
        assert_eq!(validate_toxicity(&json!("0.4")).unwrap(), 0.4);
        assert_eq!(validate_toxicity(&json!(0)).unwrap(), 0.0);
        assert_eq!(validate_toxicity(&json!(1)).unwrap(), 1.0);
    }
}
