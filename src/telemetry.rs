use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

use crate::config::LangfuseSettings;
use crate::errors::TraceError;

/// Identifies the active trace for one end-to-end request. Scores and spans
/// recorded through the client attach to this id.
#[derive(Debug, Clone)]
pub struct TraceHandle {
    pub trace_id: String,
}

/// One logical step (generation, evaluation) recorded under a trace. Opened
/// when the step starts and closed with [`TraceClient::end_span`] when it
/// completes.
#[derive(Debug, Clone)]
pub struct SpanHandle {
    pub span_id: String,
    pub trace_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy)]
pub enum ScoreKind {
    Numeric,
}

impl ScoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Numeric => "NUMERIC",
        }
    }
}

/// Client for the Langfuse-style tracing backend. All operations are
/// best-effort telemetry: the pipeline logs failures and carries on.
#[derive(Clone)]
pub struct TraceClient {
    backend: Option<LangfuseSettings>,
    client: Client,
}

impl TraceClient {
    pub fn new(backend: Option<LangfuseSettings>) -> Self {
        Self {
            backend,
            client: Client::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Open a new trace for one request. The returned handle is the
    /// pipeline's "current trace" until the response is sent.
    pub async fn start_trace(&self, name: &str) -> Result<TraceHandle, TraceError> {
        let trace_id = Uuid::new_v4().to_string();
        self.ingest(json!({
            "id": Uuid::new_v4().to_string(),
            "type": "trace-create",
            "timestamp": Utc::now().to_rfc3339(),
            "body": {
                "id": trace_id,
                "name": name,
                "timestamp": Utc::now().to_rfc3339(),
            }
        }))
        .await?;

        Ok(TraceHandle { trace_id })
    }

    /// Open a span for one step under a trace. The caller holds the handle
    /// for the duration of the step and releases it with `end_span`.
    pub async fn start_span(&self, trace_id: &str, name: &str) -> Result<SpanHandle, TraceError> {
        let span_id = Uuid::new_v4().to_string();
        self.ingest(json!({
            "id": Uuid::new_v4().to_string(),
            "type": "span-create",
            "timestamp": Utc::now().to_rfc3339(),
            "body": {
                "id": span_id,
                "traceId": trace_id,
                "name": name,
                "startTime": Utc::now().to_rfc3339(),
            }
        }))
        .await?;

        Ok(SpanHandle {
            span_id,
            trace_id: trace_id.to_string(),
            name: name.to_string(),
        })
    }

    /// Close a span opened with `start_span`, stamping its end time.
    pub async fn end_span(&self, span: &SpanHandle) -> Result<(), TraceError> {
        self.ingest(json!({
            "id": Uuid::new_v4().to_string(),
            "type": "span-update",
            "timestamp": Utc::now().to_rfc3339(),
            "body": {
                "id": span.span_id,
                "traceId": span.trace_id,
                "endTime": Utc::now().to_rfc3339(),
            }
        }))
        .await
    }

    pub async fn create_score(
        &self,
        name: &str,
        value: f64,
        trace_id: &str,
        kind: ScoreKind,
        comment: Option<&str>,
    ) -> Result<(), TraceError> {
        let backend = self.backend.as_ref().ok_or(TraceError::Disabled)?;
        let url = format!("{}/api/public/scores", backend.host);

        let mut body = json!({
            "name": name,
            "value": value,
            "traceId": trace_id,
            "dataType": kind.as_str(),
        });
        if let Some(comment) = comment {
            body["comment"] = json!(comment);
        }

        let response = self
            .client
            .post(url)
            .basic_auth(&backend.public_key, Some(&backend.secret_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TraceError::Status(response.status()));
        }

        Ok(())
    }

    async fn ingest(&self, event: serde_json::Value) -> Result<(), TraceError> {
        let backend = self.backend.as_ref().ok_or(TraceError::Disabled)?;
        let url = format!("{}/api/public/ingestion", backend.host);

        let response = self
            .client
            .post(url)
            .basic_auth(&backend.public_key, Some(&backend.secret_key))
            .json(&json!({ "batch": [event] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TraceError::Status(response.status()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_reports_disabled_everywhere() {
        let client = TraceClient::disabled();
        assert!(!client.is_enabled());

        assert!(matches!(
            client.start_trace("qa-request").await,
            Err(TraceError::Disabled)
        ));
        assert!(matches!(
            client.start_span("trace", "generation").await,
            Err(TraceError::Disabled)
        ));

        let span = SpanHandle {
            span_id: "span".to_string(),
            trace_id: "trace".to_string(),
            name: "generation".to_string(),
        };
        assert!(matches!(
            client.end_span(&span).await,
            Err(TraceError::Disabled)
        ));
        assert!(matches!(
            client
                .create_score("user-feedback", 1.0, "trace", ScoreKind::Numeric, None)
                .await,
            Err(TraceError::Disabled)
        ));
    }
}
