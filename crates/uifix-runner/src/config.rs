//! Runner and discovery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How test commands are built and how long captured runs are awaited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Folder compiled tests are emitted to, relative to the workspace.
    pub output_folder: String,

    /// Source root whose leading segments are dropped when mapping a test
    /// to its compiled location (e.g. `src`).
    pub root_folder: Option<String>,

    /// ExTester storage folder (`--storage`).
    pub temp_folder: Option<String>,

    /// VS Code version passed as `--code_version`.
    pub code_version: Option<String>,

    /// VS Code type passed as `--type` (`stable`, `insider`).
    pub code_type: Option<String>,

    /// Extra arguments appended to the single-test command.
    pub additional_args: Vec<String>,

    /// Wait before looking for the capture file.
    pub initial_delay_ms: u64,

    /// Interval between checks for the capture file.
    pub poll_interval_ms: u64,

    /// How long to keep polling after the initial delay.
    pub max_additional_wait_ms: u64,

    /// Whole-suite timeout in seconds (0 = unbounded).
    pub suite_timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            output_folder: "out".to_string(),
            root_folder: None,
            temp_folder: None,
            code_version: None,
            code_type: None,
            additional_args: Vec::new(),
            initial_delay_ms: 30_000,
            poll_interval_ms: 1_000,
            max_additional_wait_ms: 60_000,
            suite_timeout_secs: 0,
        }
    }
}

impl RunnerConfig {
    pub fn suite_timeout(&self) -> Option<Duration> {
        (self.suite_timeout_secs > 0).then(|| Duration::from_secs(self.suite_timeout_secs))
    }
}

/// Which files count as test artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Workspace-relative glob patterns.
    pub patterns: Vec<String>,
    /// Workspace-relative glob patterns excluded from discovery.
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["**/ui-test/**/*.ts".to_string()],
            exclude: vec![
                "node_modules/**".to_string(),
                "out/**".to_string(),
                ".git/**".to_string(),
            ],
        }
    }
}
