//! uifix OpenAI generator
//!
//! Implements [`uifix_core::Generator`] over the OpenAI HTTP API.

pub mod client;
pub mod config;
pub mod error;
mod wire;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
pub use error::{GeneratorError, Result};
pub use wire::{Completion, Usage};
