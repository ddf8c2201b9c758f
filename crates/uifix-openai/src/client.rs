//! OpenAI HTTP client
//!
//! Proposal lists go through chat-completions with the chat model
//! ([`Generator::generate`]). Test files and fixes go through the
//! responses endpoint with the code model ([`Generator::generate_code`]).
//! As a [`Generator`] the client never fails: a missing key yields an
//! empty string and any other error yields [`ERROR_SENTINEL`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};
use uifix_core::{Generator, ERROR_SENTINEL};

use crate::config::OpenAiConfig;
use crate::error::{GeneratorError, Result};
use crate::wire::{
    ChatMessage, ChatRequest, ChatResponse, Completion, Reasoning, ResponsesRequest,
    ResponsesResponse,
};

/// OpenAI client for test and fix generation
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("uifix/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(OpenAiClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env())
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Single-turn chat completion with the chat model
    pub async fn chat(&self, prompt: &str) -> Result<Completion> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let resp: ChatResponse = self.post("chat/completions", &request).await?;
        if resp.choices.is_empty() {
            return Err(GeneratorError::InvalidResponse(
                "chat completion had no choices".to_string(),
            ));
        }
        Ok(resp.into())
    }

    /// Responses-endpoint call with the code model
    pub async fn respond(&self, prompt: &str) -> Result<Completion> {
        let request = ResponsesRequest {
            model: &self.config.code_model,
            input: prompt,
            reasoning: Reasoning {
                effort: &self.config.reasoning_effort,
            },
        };
        let resp: ResponsesResponse = self.post("responses", &request).await?;
        Ok(resp.into())
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let key = self.config.key().ok_or(GeneratorError::MissingApiKey)?;

        let response = self
            .http_client
            .post(self.config.endpoint(path))
            .bearer_auth(key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Collapse a call result into the text the orchestrator expects.
fn degrade(endpoint: &str, model: &str, started: Instant, result: Result<Completion>) -> String {
    match result {
        Ok(completion) => {
            info!(
                endpoint,
                model,
                duration_ms = started.elapsed().as_millis() as u64,
                input_tokens = ?completion.usage.input_tokens,
                output_tokens = ?completion.usage.output_tokens,
                total_tokens = ?completion.usage.total_tokens,
                "generation completed"
            );
            completion.text
        }
        Err(GeneratorError::MissingApiKey) => {
            error!(endpoint, "{}", GeneratorError::MissingApiKey);
            String::new()
        }
        Err(e) => {
            error!(endpoint, model, error = %e, "OpenAI API error");
            ERROR_SENTINEL.to_string()
        }
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> String {
        let started = Instant::now();
        let result = self.chat(prompt).await;
        degrade("chat/completions", &self.config.model, started, result)
    }

    async fn generate_code(&self, prompt: &str) -> String {
        let started = Instant::now();
        let result = self.respond(prompt).await;
        degrade("responses", &self.config.code_model, started, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_returns_empty() {
        let client = OpenAiClient::new(OpenAiConfig::default()).unwrap();
        assert_eq!(client.generate("prompt").await, "");
        assert_eq!(client.generate_code("prompt").await, "");
    }

    #[tokio::test]
    async fn test_missing_key_is_typed_error() {
        let client = OpenAiClient::new(OpenAiConfig::default()).unwrap();
        assert!(matches!(
            client.chat("prompt").await,
            Err(GeneratorError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_sentinel() {
        let config = OpenAiConfig::default()
            .with_api_key("sk-test")
            .with_base_url("http://127.0.0.1:9");
        let client = OpenAiClient::new(config).unwrap();
        assert_eq!(client.generate("prompt").await, ERROR_SENTINEL);
    }
}
