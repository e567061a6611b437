use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::errors::SearchError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_PAGE_MAX_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// Wraps the DuckDuckGo instant-answer backend. Callers treat search as a
/// best-effort augmentation: errors from here are degraded to an empty
/// result set at the pipeline boundary, never propagated to the user.
#[derive(Clone)]
pub struct SearchClient {
    base_url: String,
    client: Client,
}

impl SearchClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!(
            "{}/?q={}&format=json&no_redirect=1&no_html=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        let payload: Value = response.json().await?;
        let mut results = Vec::new();

        if let Some(abstract_text) = payload.get("AbstractText").and_then(|v| v.as_str()) {
            if let Some(url) = payload.get("AbstractURL").and_then(|v| v.as_str()) {
                if !abstract_text.is_empty() && !url.is_empty() {
                    results.push(SearchResult {
                        title: abstract_text
                            .split(" - ")
                            .next()
                            .unwrap_or(abstract_text)
                            .to_string(),
                        body: abstract_text.to_string(),
                        url: url.to_string(),
                    });
                }
            }
        }

        if let Some(items) = payload.get("Results").and_then(|v| v.as_array()) {
            extract_topics(items, &mut results);
        }
        if let Some(items) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
            extract_topics(items, &mut results);
        }

        results.truncate(max_results);
        Ok(results)
    }

    /// Fetch a page and reduce it to plain text: scripts/styles and markup
    /// stripped, whitespace collapsed, truncated to `max_len`.
    pub async fn fetch_page_text(&self, url: &str, max_len: usize) -> Result<String, SearchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, FETCH_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::FetchStatus(response.status()));
        }

        let html = response.text().await?;
        Ok(extract_plain_text(&html, max_len))
    }

    /// Search for a question and format the hits into self-contained text
    /// blocks. When `fetch_content` is set, each hit is enriched with a
    /// plain-text page excerpt; fetch failures leave the hit as-is.
    pub async fn research(
        &self,
        question: &str,
        max_results: usize,
        fetch_content: bool,
    ) -> Result<Vec<String>, SearchError> {
        let results = self.search(question, max_results).await?;

        if results.is_empty() {
            tracing::warn!("No search results found for question: {}", question);
            return Ok(Vec::new());
        }

        let mut blocks = format_results(&results);

        if fetch_content {
            for (result, block) in results.iter().zip(blocks.iter_mut()) {
                match self.fetch_page_text(&result.url, DEFAULT_PAGE_MAX_LEN).await {
                    Ok(text) if !text.is_empty() => {
                        block.push_str("\nPage: ");
                        block.push_str(&text);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!("Error fetching page content from {}: {}", result.url, err);
                    }
                }
            }
        }

        Ok(blocks)
    }
}

fn extract_topics(items: &[Value], results: &mut Vec<SearchResult>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            extract_topics(topics, results);
            continue;
        }
        let text = item.get("Text").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchResult {
            title: text.split(" - ").next().unwrap_or(text).to_string(),
            body: text.to_string(),
            url: url.to_string(),
        });
    }
}

/// Format hits into `Title / Content / URL` blocks so downstream consumers
/// never see structured data.
pub fn format_results(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| {
            format!(
                "Title: {}\nContent: {}\nURL: {}",
                if r.title.is_empty() { "No title" } else { r.title.as_str() },
                if r.body.is_empty() { "No content" } else { r.body.as_str() },
                if r.url.is_empty() { "No URL" } else { r.url.as_str() },
            )
        })
        .collect()
}

fn extract_plain_text(html: &str, max_len: usize) -> String {
    static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();

    let script_re = SCRIPT_RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("valid pattern")
    });
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("valid pattern"));

    let without_blocks = script_re.replace_all(html, "\n");
    let without_tags = tag_re.replace_all(&without_blocks, "\n");

    // Multi-headline lines are separated by runs of spaces; break them up.
    let mut text = without_tags
        .lines()
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.chars().count() > max_len {
        text = text.chars().take(max_len).collect::<String>() + "...";
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_results_builds_self_contained_blocks() {
        let results = vec![SearchResult {
            title: "Rust".to_string(),
            body: "A systems language.".to_string(),
            url: "https://rust-lang.org".to_string(),
        }];

        let blocks = format_results(&results);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0],
            "Title: Rust\nContent: A systems language.\nURL: https://rust-lang.org"
        );
    }

    #[test]
    fn format_results_substitutes_placeholders_for_missing_fields() {
        let results = vec![SearchResult {
            title: String::new(),
            body: String::new(),
            url: String::new(),
        }];

        let blocks = format_results(&results);
        assert_eq!(blocks[0], "Title: No title\nContent: No content\nURL: No URL");
    }

    #[test]
    fn extract_plain_text_strips_scripts_styles_and_tags() {
        let html = "<html><head><style>body { color: red; }</style>\
                    <script>alert('x');</script></head>\
                    <body><h1>Heading</h1>  <p>First   line</p></body></html>";

        let text = extract_plain_text(html, 1000);
        assert_eq!(text, "Heading\nFirst\nline");
        assert!(!text.contains("alert"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn extract_plain_text_splits_multi_headline_lines() {
        let html = "<body>Breaking news  Market update  <b>Weather</b></body>";
        let text = extract_plain_text(html, 1000);
        assert_eq!(text, "Breaking news\nMarket update\nWeather");
    }

    #[test]
    fn extract_plain_text_truncates_long_content() {
        let html = format!("<p>{}</p>", "a".repeat(50));
        let text = extract_plain_text(&html, 10);
        assert_eq!(text, format!("{}...", "a".repeat(10)));
    }

    #[tokio::test]
    async fn search_against_unreachable_backend_errors_without_panicking() {
        let client = SearchClient::new("http://127.0.0.1:9".to_string());

        // Two consecutive attempts behave identically: a typed error, no panic.
        assert!(client.search("what is rust?", 3).await.is_err());
        assert!(client.search("what is rust?", 3).await.is_err());
    }

    #[tokio::test]
    async fn fetch_page_text_degrades_on_unreachable_host() {
        let client = SearchClient::new("http://127.0.0.1:9".to_string());
        let result = client.fetch_page_text("http://127.0.0.1:9/page", 100).await;
        assert!(result.is_err());
    }
}
