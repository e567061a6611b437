use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{ask, health, score};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ask", post(ask::ask))
        .route("/score", post(score::score))
        .with_state(state)
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::errors::LlmError;
    use crate::llm::{ChatRequest, LlmProvider};
    use crate::pipeline::Pipeline;
    use crate::prompts::PromptStore;
    use crate::search::SearchClient;
    use crate::telemetry::TraceClient;

    struct CountingLlm {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmProvider for CountingLlm {
        fn name(&self) -> &str {
            "mock"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("An answer.".to_string())
        }
    }

    fn test_state(calls: Arc<AtomicUsize>) -> Arc<AppState> {
        let pipeline = Pipeline::new(
            Arc::new(CountingLlm { calls }),
            SearchClient::new("http://127.0.0.1:9".to_string()),
            PromptStore::disabled(),
            TraceClient::disabled(),
            "gpt-4o-mini".to_string(),
            "development".to_string(),
            3,
        );

        Arc::new(AppState {
            settings: Settings::from_env(),
            pipeline,
            started_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn score_rejects_non_numeric_toxicity_before_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = router(test_state(calls.clone()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/score")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("question=What+is+AI%3F&toxicity=abc"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn health_reports_provider_and_tracing_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = router(test_state(calls));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["provider"], "mock");
        assert_eq!(payload["tracing_enabled"], false);
        assert!(payload["started_at"].as_str().is_some());
    }
}
