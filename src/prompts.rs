use reqwest::Client;
use serde_json::{json, Value};

use crate::config::LangfuseSettings;
use crate::errors::PromptError;

/// Name of the system-prompt template in the external store.
pub const PROMPT_NAME: &str = "qa-system-prompt-dev";

/// Used whenever the template store is unreachable or unconfigured.
pub const FALLBACK_PROMPT: &str = "You are a helpful assistant that provides clear and \
concise answers. When you use information from search results, cite your sources. \
{{search_context}}";

const SEARCH_CONTEXT_MARKER: &str = "{{search_context}}";
const SEARCH_CONTEXT_PREAMBLE: &str =
    "I found the following information that might help answer your question:\n\n";

/// Client for the external prompt template store. Templates are re-fetched on
/// every generation; request volume is low enough that caching is not worth
/// the staleness.
#[derive(Clone)]
pub struct PromptStore {
    backend: Option<LangfuseSettings>,
    client: Client,
}

impl PromptStore {
    pub fn new(backend: Option<LangfuseSettings>) -> Self {
        Self {
            backend,
            client: Client::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub async fn get_template(&self, name: &str, label: &str) -> Result<String, PromptError> {
        let backend = self.backend.as_ref().ok_or(PromptError::Disabled)?;
        let url = format!(
            "{}/api/public/v2/prompts/{}?label={}",
            backend.host,
            urlencoding::encode(name),
            urlencoding::encode(label)
        );

        let response = self
            .client
            .get(url)
            .basic_auth(&backend.public_key, Some(&backend.secret_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PromptError::Status(response.status()));
        }

        let payload: Value = response.json().await?;
        payload
            .get("prompt")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(PromptError::MissingBody)
    }

    pub async fn create_or_update(
        &self,
        name: &str,
        body: &str,
        config: Value,
        labels: &[String],
    ) -> Result<(), PromptError> {
        let backend = self.backend.as_ref().ok_or(PromptError::Disabled)?;
        let url = format!("{}/api/public/v2/prompts", backend.host);

        let response = self
            .client
            .post(url)
            .basic_auth(&backend.public_key, Some(&backend.secret_key))
            .json(&json!({
                "type": "text",
                "name": name,
                "prompt": body,
                "config": config,
                "labels": labels,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PromptError::Status(response.status()));
        }

        Ok(())
    }
}

/// Fetch the template from the store (fallback on any failure) and splice the
/// formatted search context into its substitution marker.
pub async fn build_system_prompt(
    store: &PromptStore,
    label: &str,
    search_results: Option<&[String]>,
) -> String {
    let template = match store.get_template(PROMPT_NAME, label).await {
        Ok(template) => template,
        Err(err) => {
            tracing::warn!("Prompt fetch failed, using fallback. Reason: {}", err);
            FALLBACK_PROMPT.to_string()
        }
    };

    render_system_prompt(&template, search_results)
}

pub fn render_system_prompt(template: &str, search_results: Option<&[String]>) -> String {
    let search_block = match search_results {
        Some(results) if !results.is_empty() => {
            let sources = results
                .iter()
                .enumerate()
                .map(|(i, r)| format!("Source {}:\n{}", i + 1, r))
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("{}{}", SEARCH_CONTEXT_PREAMBLE, sources)
        }
        _ => String::new(),
    };

    template.replace(SEARCH_CONTEXT_MARKER, &search_block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_with_no_results_removes_the_marker() {
        let rendered = render_system_prompt(FALLBACK_PROMPT, None);
        assert!(!rendered.contains(SEARCH_CONTEXT_MARKER));
        assert!(rendered.ends_with("cite your sources. "));

        let rendered_empty = render_system_prompt(FALLBACK_PROMPT, Some(&[]));
        assert_eq!(rendered, rendered_empty);
    }

    #[test]
    fn render_numbers_sources_in_order() {
        let results = vec!["X".to_string(), "Y".to_string()];
        let rendered = render_system_prompt(FALLBACK_PROMPT, Some(&results));

        assert!(rendered.contains("Source 1:\nX"));
        assert!(rendered.contains("Source 2:\nY"));
        assert!(rendered.contains(SEARCH_CONTEXT_PREAMBLE));
    }

    #[test]
    fn render_leaves_templates_without_marker_untouched() {
        let rendered = render_system_prompt("Just answer.", Some(&["X".to_string()]));
        assert_eq!(rendered, "Just answer.");
    }

    #[tokio::test]
    async fn build_system_prompt_falls_back_when_store_disabled() {
        let store = PromptStore::disabled();
        let rendered = build_system_prompt(&store, "development", None).await;
        assert!(rendered.starts_with("You are a helpful assistant"));
    }
}
