//! Parsed failure records and their classification.

use serde::{Deserialize, Serialize};

/// Title given to a failure that was opened by an error, location or
/// stack line before any failure-block header was seen.
pub const DEFAULT_FAILURE_TITLE: &str = "Unknown test";

/// Title given to the single failure synthesized by the parser fallback.
pub const FALLBACK_FAILURE_TITLE: &str = "Unknown failing test";

/// One failure detected in captured test output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFailure {
    /// Suite/test name, or `file:line:col` for compiler diagnostics.
    pub title: String,

    /// Best-effort source file associated with the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Normalized single-line description.
    pub error_message: String,

    /// Raw stack-trace lines, newline-terminated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ParsedFailure {
    /// Create a failure with a title and an empty message.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: None,
            error_message: String::new(),
            stack: None,
        }
    }

    /// Set the error message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Set the file path.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Append one raw stack line (a newline is added).
    pub fn push_stack_line(&mut self, line: &str) {
        let stack = self.stack.get_or_insert_with(String::new);
        stack.push_str(line);
        stack.push('\n');
    }
}

/// Ordered output of one parse pass over one captured-output string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseResult {
    pub failures: Vec<ParsedFailure>,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// First failure in document order.
    pub fn first(&self) -> Option<&ParsedFailure> {
        self.failures.first()
    }
}

/// Category resolved for a failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    Runtime,
    Compilation,
    Unknown,
}

impl FailureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureType::Runtime => "runtime",
            FailureType::Compilation => "compilation",
            FailureType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which prompt/strategy a failure is routed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemediationPath {
    /// General fix prompt; only for failures that are compilation-like and
    /// not runtime-like.
    Compilation,
    /// Runtime fix prompt; everything else, including ambiguous failures.
    Runtime,
}

/// Derived, stateless view of a [`ParsedFailure`].
///
/// Both flags may be set at once; use [`FailureClassification::remediation`]
/// for a binary decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailureClassification {
    pub is_runtime_failure: bool,
    pub is_compilation_failure: bool,
    pub failure_type: FailureType,
}

impl FailureClassification {
    /// Compilation-only failures take the compilation path; pure runtime,
    /// both and neither take the runtime path.
    pub fn remediation(&self) -> RemediationPath {
        if self.is_compilation_only() {
            RemediationPath::Compilation
        } else {
            RemediationPath::Runtime
        }
    }

    pub fn is_compilation_only(&self) -> bool {
        self.is_compilation_failure && !self.is_runtime_failure
    }
}

/// Collect the distinct non-empty `file` values in first-seen order.
pub fn extract_test_files(failures: &[ParsedFailure]) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for file in failures.iter().filter_map(|f| f.file.as_deref()) {
        let file = file.trim();
        if !file.is_empty() && !files.iter().any(|f| f == file) {
            files.push(file.to_string());
        }
    }
    files
}
