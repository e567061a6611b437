use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::llm::OpenAiProvider;
use crate::pipeline::Pipeline;
use crate::prompts::PromptStore;
use crate::search::SearchClient;
use crate::telemetry::TraceClient;

/// Read-only service handles shared by all requests. Initialization order:
/// load settings, construct clients, construct the pipeline.
pub struct AppState {
    pub settings: Settings,
    pub pipeline: Pipeline,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let settings = Settings::from_env();

        let llm = Arc::new(OpenAiProvider::new(
            settings.openai_base_url.clone(),
            settings.openai_api_key.clone(),
        ));
        let search = SearchClient::new(settings.search_base_url.clone());
        let prompts = PromptStore::new(settings.langfuse.clone());
        let tracer = TraceClient::new(settings.langfuse.clone());

        let pipeline = Pipeline::new(
            llm,
            search,
            prompts,
            tracer,
            settings.model.clone(),
            settings.prompt_label.clone(),
            settings.max_search_results,
        );
        let started_at = Utc::now();

        Ok(Arc::new(AppState {
            settings,
            pipeline,
            started_at,
        }))
    }
}
