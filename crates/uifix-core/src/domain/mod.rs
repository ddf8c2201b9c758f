//! Domain models for uifix.
//!
//! Canonical definitions for the core entities:
//! - `ParsedFailure` / `ParseResult`: failures recovered from test output
//! - `FailureClassification`: derived runtime/compilation view of a failure
//! - `TestRunResult`: outcome of one test process invocation
//! - `TestProposal`: a generated test scenario

pub mod error;
pub mod failure;
pub mod proposal;
pub mod run;

pub use error::{Result, UifixError};
pub use failure::{
    extract_test_files, FailureClassification, FailureType, ParseResult, ParsedFailure,
    RemediationPath, DEFAULT_FAILURE_TITLE, FALLBACK_FAILURE_TITLE,
};
pub use proposal::{normalize_limit, TestGenerationResult, TestProposal};
pub use run::{TestRunResult, Verdict};
