//! Keyword classifier for parsed failures.
//!
//! Labels a failure runtime-like and/or compilation-like from its message
//! and title. Both labels can hold at once; routing uses
//! [`FailureClassification::remediation`].

use crate::domain::failure::{FailureClassification, FailureType, ParsedFailure};

/// Lower-cased phrases that indicate a failure during test execution.
const RUNTIME_INDICATORS: &[&str] = &[
    "timeout",
    "nosuchelement",
    "staleelementreference",
    "elementnotinteractable",
    "element not interactable",
    "webdriver",
    "sessionnotcreatederror",
    "unhandledpromiserejection",
    "unhandled promise rejection",
    "cannot find element",
    "element not found",
    "waiting for element",
    "element is not attached",
    "element is not clickable",
    "element is not visible",
    "element is not enabled",
];

/// Lower-cased phrases that indicate the test did not build or type-check.
const COMPILATION_INDICATORS: &[&str] = &[
    "error ts",
    "typescript error",
    "syntax error",
    "syntaxerror",
    "cannot find name",
    "property does not exist",
    "does not exist on type",
    "is not assignable to",
    "type error",
    "module not found",
    "cannot find module",
    "import error",
];

fn matches_any(haystacks: &[&str], needles: &[&str]) -> bool {
    haystacks
        .iter()
        .any(|text| needles.iter().any(|needle| text.contains(needle)))
}

/// Classify one failure.
pub fn classify(failure: &ParsedFailure) -> FailureClassification {
    let message = failure.error_message.to_lowercase();
    let title = failure.title.to_lowercase();
    let texts = [message.as_str(), title.as_str()];

    let is_runtime_failure = matches_any(&texts, RUNTIME_INDICATORS);
    let is_compilation_failure = matches_any(&texts, COMPILATION_INDICATORS);

    let failure_type = if is_runtime_failure {
        FailureType::Runtime
    } else if is_compilation_failure {
        FailureType::Compilation
    } else {
        FailureType::Unknown
    };

    FailureClassification {
        is_runtime_failure,
        is_compilation_failure,
        failure_type,
    }
}
