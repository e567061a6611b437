//! One-shot utility that creates or updates the system-prompt template in
//! the external prompt store.

use serde_json::json;

use qa_backend::config::Settings;
use qa_backend::logging;
use qa_backend::prompts::{PromptStore, FALLBACK_PROMPT, PROMPT_NAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    logging::init(None);

    let store = PromptStore::new(settings.langfuse.clone());

    store
        .create_or_update(
            PROMPT_NAME,
            FALLBACK_PROMPT,
            json!({ "model": settings.model, "temperature": 0 }),
            &[settings.prompt_label.clone()],
        )
        .await?;

    tracing::info!(
        "Successfully created/updated prompt '{}' with label '{}'",
        PROMPT_NAME,
        settings.prompt_label
    );

    Ok(())
}
