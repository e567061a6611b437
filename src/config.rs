use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PROMPT_LABEL: &str = "development";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.duckduckgo.com";
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 3;

/// Credentials for the Langfuse-style observability backend, which serves
/// both as the prompt template store and the score/trace sink.
#[derive(Debug, Clone)]
pub struct LangfuseSettings {
    pub host: String,
    pub public_key: String,
    pub secret_key: String,
}

impl LangfuseSettings {
    /// Only a complete credential set enables the backend; a partial one is
    /// treated as absent.
    pub fn from_parts(
        host: Option<String>,
        public_key: Option<String>,
        secret_key: Option<String>,
    ) -> Option<Self> {
        match (host, public_key, secret_key) {
            (Some(host), Some(public_key), Some(secret_key)) => Some(Self {
                host: host.trim_end_matches('/').to_string(),
                public_key,
                secret_key,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub prompt_label: String,
    pub langfuse: Option<LangfuseSettings>,
    pub search_base_url: String,
    pub max_search_results: usize,
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        let langfuse = LangfuseSettings::from_parts(
            non_empty_env("LANGFUSE_HOST"),
            non_empty_env("LANGFUSE_PUBLIC_KEY"),
            non_empty_env("LANGFUSE_SECRET_KEY"),
        );

        Settings {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_base_url: non_empty_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: non_empty_env("QA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            prompt_label: non_empty_env("PROMPT_LABEL")
                .unwrap_or_else(|| DEFAULT_PROMPT_LABEL.to_string()),
            langfuse,
            search_base_url: non_empty_env("SEARCH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
            max_search_results: non_empty_env("SEARCH_MAX_RESULTS")
                .and_then(|val| val.parse::<usize>().ok())
                .unwrap_or(DEFAULT_MAX_SEARCH_RESULTS),
            log_dir: non_empty_env("QA_LOG_DIR").map(PathBuf::from),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn langfuse_settings_require_all_parts() {
        assert!(LangfuseSettings::from_parts(
            Some("https://cloud.langfuse.com".to_string()),
            Some("pk".to_string()),
            None
        )
        .is_none());
        assert!(LangfuseSettings::from_parts(None, None, None).is_none());

        let settings = LangfuseSettings::from_parts(
            Some("https://cloud.langfuse.com/".to_string()),
            Some("pk".to_string()),
            Some("sk".to_string()),
        )
        .expect("complete credentials");
        assert_eq!(settings.host, "https://cloud.langfuse.com");
    }
}
