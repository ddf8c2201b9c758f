//! Test process invocation results.

use serde::{Deserialize, Serialize};

/// How `success` on a [`TestRunResult`] was decided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// From the process exit code. Authoritative.
    ExitCode,
    /// From pattern-matching captured text. Absence of a known failure
    /// phrase counts as success, so genuinely failing output that matches
    /// nothing is reported as passing.
    OutputHeuristic,
}

/// Outcome of one test process invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestRunResult {
    pub success: bool,

    /// Raw exit code; `None` when the process never produced one.
    pub exit_code: Option<i32>,

    pub stdout: String,

    pub stderr: String,

    /// Command string that was executed.
    pub command: String,

    /// Working directory used for the process.
    pub cwd: String,

    pub verdict: Verdict,
}

impl TestRunResult {
    /// Result whose success is taken from an exit code.
    pub fn from_exit(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        command: impl Into<String>,
        cwd: impl Into<String>,
    ) -> Self {
        Self {
            success: exit_code == Some(0),
            exit_code,
            stdout,
            stderr,
            command: command.into(),
            cwd: cwd.into(),
            verdict: Verdict::ExitCode,
        }
    }

    /// Result whose success is taken from output sniffing. The exit code
    /// is synthesized as 0/1.
    pub fn from_heuristic(
        success: bool,
        stdout: String,
        stderr: String,
        command: impl Into<String>,
        cwd: impl Into<String>,
    ) -> Self {
        Self {
            success,
            exit_code: Some(if success { 0 } else { 1 }),
            stdout,
            stderr,
            command: command.into(),
            cwd: cwd.into(),
            verdict: Verdict::OutputHeuristic,
        }
    }

    /// A failing result for an invocation that could not run at all.
    pub fn errored(error: impl Into<String>, command: impl Into<String>, cwd: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: error.into(),
            command: command.into(),
            cwd: cwd.into(),
            verdict: Verdict::ExitCode,
        }
    }

    /// Stdout and stderr joined by a newline, the text fed to the parser.
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    pub fn is_heuristic(&self) -> bool {
        self.verdict == Verdict::OutputHeuristic
    }
}
