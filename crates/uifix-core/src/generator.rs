//! Code-generation collaborator port and response cleaning.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

/// Text returned by a generator whose request failed.
pub const ERROR_SENTINEL: &str = "An error occurred while fetching the response.";

/// Text generation backend.
///
/// Implementations never fail: transport or service errors degrade to an
/// empty string or [`ERROR_SENTINEL`], which callers treat as "no output".
#[async_trait]
pub trait Generator: Send + Sync {
    /// General-purpose completion (proposal lists).
    async fn generate(&self, prompt: &str) -> String;

    /// Completion for source code (test files and fixes). Defaults to
    /// [`Generator::generate`].
    async fn generate_code(&self, prompt: &str) -> String {
        self.generate(prompt).await
    }
}

/// Line-leading markdown fence with an optional language tag.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_.+-]*[ \t]*(?:\r?\n|$)").expect("fence pattern is valid"));

/// Strip markdown code fences and surrounding whitespace from a raw
/// response so it can be written as file content.
pub fn clean_generated_content(raw: &str) -> String {
    let without_fences = FENCE.replace_all(raw.trim(), "");
    let trimmed = without_fences.trim();
    trimmed
        .strip_prefix("\r\n")
        .or_else(|| trimmed.strip_prefix('\n'))
        .unwrap_or(trimmed)
        .to_string()
}

/// Whether a cleaned response carries no usable content.
pub fn is_no_output(cleaned: &str) -> bool {
    let cleaned = cleaned.trim();
    cleaned.is_empty() || cleaned == ERROR_SENTINEL
}
