//! OpenAI client configuration.

use serde::{Deserialize, Serialize};

/// OpenAI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; never serialized back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Chat-completions model used for proposals and test files
    pub model: String,
    /// Responses-endpoint model used for fixes
    pub code_model: String,
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Reasoning effort requested from the code model
    pub reasoning_effort: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            model: "gpt-5".to_string(),
            code_model: "gpt-5-codex".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 600,
            reasoning_effort: "medium".to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `OPENAI_API_KEY`, `UIFIX_MODEL`, `UIFIX_CODE_MODEL` and
    /// `UIFIX_BASE_URL` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = get("UIFIX_MODEL") {
            self.model = model;
        }
        if let Some(model) = get("UIFIX_CODE_MODEL") {
            self.code_model = model;
        }
        if let Some(url) = get("UIFIX_BASE_URL") {
            self.base_url = url;
        }
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
