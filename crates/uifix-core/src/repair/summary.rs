//! Workflow summaries.
//!
//! Every workflow ends with one of these, whichever path it took. The
//! `Display` output is deterministic: lists are sorted or kept in
//! discovery order and no timestamps are printed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How GenerateProposals ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOutcome {
    /// Proposals were parsed and processed.
    Completed,
    /// The generator returned nothing.
    EmptyResponse,
    /// The response was not a JSON array of proposals.
    Unparsable,
}

/// Result of GenerateProposals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalSummary {
    pub outcome: ProposalOutcome,
    /// Workspace-relative directory the tests were written under.
    pub test_dir: String,
    /// Number of proposals the generator returned.
    pub total_available: usize,
    /// Number of proposals processed after applying the limit.
    pub processed: usize,
    /// Files written with generated content, in proposal order.
    pub generated: Vec<String>,
    /// Files written with the placeholder skeleton.
    pub placeholders: Vec<String>,
    /// Files that could not be written at all.
    pub failed: Vec<String>,
}

impl ProposalSummary {
    pub fn ended(outcome: ProposalOutcome, test_dir: impl Into<String>) -> Self {
        Self {
            outcome,
            test_dir: test_dir.into(),
            total_available: 0,
            processed: 0,
            generated: Vec::new(),
            placeholders: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn limited(&self) -> bool {
        self.processed < self.total_available
    }
}

impl fmt::Display for ProposalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            ProposalOutcome::EmptyResponse => {
                return writeln!(f, "Generation skipped: empty response from the generator.")
            }
            ProposalOutcome::Unparsable => {
                return writeln!(
                    f,
                    "Generation aborted: the proposal response could not be parsed."
                )
            }
            ProposalOutcome::Completed => {}
        }
        write!(
            f,
            "Generated {}/{} UI test files in {}",
            self.generated.len(),
            self.processed,
            self.test_dir
        )?;
        if self.limited() {
            write!(
                f,
                " (limited to {} of {} proposals)",
                self.processed, self.total_available
            )?;
        }
        writeln!(f, ".")?;
        write_list(f, "Placeholder files written:", &self.placeholders)?;
        write_list(f, "Files that could not be written:", &self.failed)
    }
}

/// How FixCompilationIssues ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompilationOutcome {
    /// The first suite run passed; nothing was changed.
    AlreadyPassing,
    /// A fix was written and the re-run passed.
    Fixed,
    /// A fix was written but the re-run still fails.
    StillFailing,
    /// The suite failed but no failure could be parsed from its output.
    Unparsable,
    /// The generator produced no usable content.
    NoFixProduced,
    /// The fix could not be written.
    WriteFailed,
}

impl CompilationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilationOutcome::AlreadyPassing => "already passing",
            CompilationOutcome::Fixed => "fixed",
            CompilationOutcome::StillFailing => "still failing",
            CompilationOutcome::Unparsable => "ran but unparsable",
            CompilationOutcome::NoFixProduced => "no fix produced",
            CompilationOutcome::WriteFailed => "fix could not be written",
        }
    }
}

/// Result of FixCompilationIssues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompilationSummary {
    pub outcome: CompilationOutcome,
    /// Discovered test files not named by any failure (workspace-relative).
    pub compilable: Vec<String>,
    /// Files named by failures (workspace-relative, first-seen order).
    pub failing: Vec<String>,
    /// Title of the failure a fix was attempted for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeted_failure: Option<String>,
    /// Where the fix was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_path: Option<String>,
}

impl CompilationSummary {
    pub fn new(outcome: CompilationOutcome) -> Self {
        Self {
            outcome,
            compilable: Vec::new(),
            failing: Vec::new(),
            targeted_failure: None,
            fix_path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.outcome,
            CompilationOutcome::AlreadyPassing | CompilationOutcome::Fixed
        )
    }
}

impl fmt::Display for CompilationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Compilation check: {}.", self.outcome.as_str())?;
        if let Some(title) = &self.targeted_failure {
            writeln!(f, "Targeted failure: {title}")?;
        }
        if let Some(path) = &self.fix_path {
            writeln!(f, "Fix written to: {path}")?;
        }
        write_list(f, "Compilable without error:", &self.compilable)?;
        write_list(f, "Still failing:", &self.failing)
    }
}

/// Result of FixRuntimeFailures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeSummary {
    pub discovered: usize,
    /// Sorted, workspace-relative.
    pub passing: Vec<String>,
    /// Sorted, workspace-relative.
    pub unresolved: Vec<String>,
    /// Failing artifacts with no runtime-routed failure; left untouched.
    pub skipped: Vec<String>,
    pub fixed_count: usize,
    pub total_failures: usize,
}

impl RuntimeSummary {
    pub fn is_success(&self) -> bool {
        self.unresolved.is_empty() && self.skipped.is_empty()
    }
}

impl fmt::Display for RuntimeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.discovered == 0 {
            return writeln!(f, "Runtime fix: no UI test files discovered.");
        }
        writeln!(
            f,
            "Runtime fix: {} fixes applied for {} runtime failures across {} test files.",
            self.fixed_count, self.total_failures, self.discovered
        )?;
        write_list(f, "Passing:", &self.passing)?;
        write_list(f, "Unresolved runtime failures:", &self.unresolved)?;
        write_list(f, "Failing without runtime failures (skipped):", &self.skipped)
    }
}

/// Result of RunAndFix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunAndFixSummary {
    pub compilation: CompilationSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeSummary>,
    /// Error that ended the runtime phase, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_error: Option<String>,
}

impl fmt::Display for RunAndFixSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compilation)?;
        match (&self.runtime, &self.runtime_error) {
            (Some(runtime), _) => write!(f, "{runtime}"),
            (None, Some(err)) => writeln!(f, "Runtime phase failed: {err}"),
            (None, None) => Ok(()),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{heading}")?;
    for item in items {
        writeln!(f, " - {item}")?;
    }
    Ok(())
}
