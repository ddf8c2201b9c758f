//! Detached execution with output read back from a capture file.
//!
//! A single-test run is launched in the background with its combined
//! output piped through `tee` into a side file. The caller does not wait
//! on the process; it waits an initial delay and then polls for the file
//! within a bounded window. A file that never appears yields empty output.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use uifix_core::Result;

use crate::config::RunnerConfig;
use crate::process::{shell, spawn_error};

static ARG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).expect("argument pattern is valid"));

/// Starts a command without waiting for it to finish.
#[async_trait]
pub trait CommandLauncher: Send + Sync {
    async fn launch(&self, command: &str, cwd: &Path) -> Result<()>;
}

/// Launches through `sh -c` and reaps the child on a background task.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedShell;

#[async_trait]
impl CommandLauncher for DetachedShell {
    async fn launch(&self, command: &str, cwd: &Path) -> Result<()> {
        let mut child = shell(command, cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(command, e))?;

        let label = command.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(command = %label, code = ?status.code(), "detached command exited"),
                Err(e) => warn!(command = %label, error = %e, "detached command wait failed"),
            }
        });
        Ok(())
    }
}

/// Timing of the capture-file wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePolicy {
    pub initial_delay: Duration,
    pub poll_interval: Duration,
    pub max_additional_wait: Duration,
}

impl CapturePolicy {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_additional_wait: Duration::from_millis(config.max_additional_wait_ms),
        }
    }
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self::from_config(&RunnerConfig::default())
    }
}

/// Capture file for a run started at `millis` since the Unix epoch.
pub fn capture_file(root: &Path, millis: i64) -> PathBuf {
    root.join(format!(".test-results-{millis}.txt"))
}

/// Fresh capture file path for a run starting now.
pub fn new_capture_file(root: &Path) -> PathBuf {
    capture_file(root, chrono::Utc::now().timestamp_millis())
}

/// Split a free-form argument string on whitespace, keeping
/// double-quoted runs together.
pub fn split_args(raw: &str) -> Vec<String> {
    ARG_TOKEN
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// ExTester command that sets up VS Code and runs one compiled test.
pub fn single_test_command(compiled: &Path, config: &RunnerConfig) -> String {
    let mut cmd = format!("npx extest setup-and-run '{}'", compiled.display());
    if let Some(storage) = non_blank(&config.temp_folder) {
        cmd.push_str(&format!(" --storage '{storage}'"));
    }
    if let Some(version) = non_blank(&config.code_version) {
        cmd.push_str(&format!(" --code_version {version}"));
    }
    if let Some(kind) = non_blank(&config.code_type) {
        cmd.push_str(&format!(" --type {kind}"));
    }
    for arg in config.additional_args.iter().flat_map(|a| split_args(a)) {
        cmd.push(' ');
        cmd.push_str(&arg);
    }
    cmd
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Wrap `command` so its combined output is also written to `capture`.
pub fn tee_command(command: &str, capture: &Path) -> String {
    format!("{} 2>&1 | tee \"{}\"", command, capture.display())
}

/// What was read back from a capture file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Captured text, lossily decoded. Empty when the file never appeared.
    pub output: String,
    /// Set when the file exists but could not be read.
    pub read_error: Option<String>,
}

/// Wait for `path` per `policy` and return its contents. A file that never
/// appears yields empty output; one that appears but cannot be read is
/// reported through `read_error`.
pub async fn await_capture(path: &Path, policy: &CapturePolicy) -> CapturedOutput {
    tokio::time::sleep(policy.initial_delay).await;

    let mut waited = Duration::ZERO;
    loop {
        match tokio::fs::try_exists(path).await {
            Ok(false) => {}
            Ok(true) | Err(_) => return read_capture(path).await,
        }
        if waited >= policy.max_additional_wait {
            break;
        }
        tokio::time::sleep(policy.poll_interval).await;
        waited += policy.poll_interval;
    }

    info!(
        path = %path.display(),
        waited_ms = (policy.initial_delay + waited).as_millis() as u64,
        "capture file never appeared; treating output as empty"
    );
    CapturedOutput::default()
}

async fn read_capture(path: &Path) -> CapturedOutput {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "capture file read");
            CapturedOutput {
                output: String::from_utf8_lossy(&bytes).into_owned(),
                read_error: None,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "capture file unreadable");
            CapturedOutput {
                output: String::new(),
                read_error: Some(format!("Failed to read result file: {e}")),
            }
        }
    }
}
