//! Request and response bodies for the chat-completions and responses
//! endpoints. Only the fields uifix reads are modelled.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub reasoning: Reasoning<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Reasoning<'a> {
    pub effort: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsesResponse {
    /// Present on some API versions as a convenience aggregate.
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    pub usage: Option<ResponsesUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsesUsage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// Token accounting reported with a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// Text returned by the API plus its usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

impl From<ChatResponse> for Completion {
    fn from(resp: ChatResponse) -> Self {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();
        Completion { text, usage }
    }
}

impl From<ResponsesResponse> for Completion {
    fn from(resp: ResponsesResponse) -> Self {
        let text = match resp.output_text {
            Some(text) => text,
            None => resp
                .output
                .into_iter()
                .filter(|item| item.kind == "message")
                .flat_map(|item| item.content)
                .filter(|c| c.kind == "output_text")
                .filter_map(|c| c.text)
                .collect::<Vec<_>>()
                .join(""),
        };
        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();
        Completion { text, usage }
    }
}
