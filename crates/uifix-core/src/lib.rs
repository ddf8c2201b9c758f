//! uifix core library
//!
//! Failure extraction, classification and repair orchestration for UI
//! test suites. Concrete test runners and generators live in sibling
//! crates and plug in through the [`TestExecutor`], [`TestDiscoverer`]
//! and [`Generator`] traits.

pub mod classifier;
pub mod context;
pub mod domain;
pub mod executor;
pub mod failure_parser;
pub mod generator;
pub mod manifest;
pub mod obs;
pub mod progress;
pub mod prompts;
pub mod repair;
pub mod sanitize;
pub mod scaffold;
pub mod telemetry;
pub mod workspace;

pub use classifier::classify;

pub use context::ScopedContext;

pub use domain::{
    extract_test_files, normalize_limit, FailureClassification, FailureType, ParseResult,
    ParsedFailure, RemediationPath, Result, TestGenerationResult, TestProposal, TestRunResult,
    UifixError, Verdict,
};

pub use executor::{TestDiscoverer, TestExecutor};

pub use failure_parser::parse_failures;

pub use generator::{clean_generated_content, is_no_output, Generator, ERROR_SENTINEL};

pub use manifest::ManifestContext;

pub use progress::{NullProgress, ProgressReporter, ProgressSink, ProgressUpdate};

pub use repair::{
    ArtifactOutcome, CompilationOutcome, CompilationSummary, FixAttempt, Orchestrator,
    ProposalOutcome, ProposalSummary, RepairConfig, RunAndFixSummary, RuntimeSummary,
};

pub use sanitize::sanitize;

pub use telemetry::init_tracing;

pub use workspace::{DefaultDestination, DestinationChooser, Workspace};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
