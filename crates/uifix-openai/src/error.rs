//! Error types for uifix-openai

use thiserror::Error;

/// Errors that can occur while calling the OpenAI API
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// No API key configured
    #[error("OpenAI API key missing; set OPENAI_API_KEY or [openai].api_key")]
    MissingApiKey,

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status
    #[error("OpenAI API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Unexpected OpenAI response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GeneratorError {
    fn from(err: reqwest::Error) -> Self {
        GeneratorError::Http(err.to_string())
    }
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
