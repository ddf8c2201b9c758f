//! npm / ExTester backed test execution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use uifix_core::{Result, TestExecutor, TestRunResult, UifixError};

use crate::capture::{
    await_capture, new_capture_file, single_test_command, tee_command, CapturePolicy,
    CommandLauncher, DetachedShell,
};
use crate::compiled::compiled_path;
use crate::config::RunnerConfig;
use crate::outcome::output_indicates_failure;
use crate::process::run_shell;
use crate::script::suite_command;

/// Runs the workspace's npm UI test script for the whole suite and
/// `extest setup-and-run` for single test files.
pub struct NpmTestExecutor {
    root: PathBuf,
    config: RunnerConfig,
    policy: CapturePolicy,
    launcher: Arc<dyn CommandLauncher>,
}

impl NpmTestExecutor {
    pub fn new(root: impl Into<PathBuf>, config: RunnerConfig) -> Self {
        let policy = CapturePolicy::from_config(&config);
        Self {
            root: root.into(),
            config,
            policy,
            launcher: Arc::new(DetachedShell),
        }
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn CommandLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_policy(mut self, policy: CapturePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cwd(&self) -> String {
        self.root.display().to_string()
    }
}

#[async_trait]
impl TestExecutor for NpmTestExecutor {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn run_all(&self) -> Result<TestRunResult> {
        let command = suite_command(&self.root)?;
        info!(command = %command, "running test suite");

        let output = run_shell(&command, &self.root, self.config.suite_timeout()).await?;
        if output.command_not_found() {
            return Err(UifixError::CommandNotFound { command });
        }

        info!(
            exit_code = ?output.exit_code,
            duration_ms = output.duration_ms,
            "test suite finished"
        );
        Ok(TestRunResult::from_exit(
            output.exit_code,
            output.stdout,
            output.stderr,
            command,
            self.cwd(),
        ))
    }

    #[instrument(skip(self, artifact), fields(artifact = %artifact.display()))]
    async fn run_one(&self, artifact: &Path) -> Result<TestRunResult> {
        let compiled = compiled_path(&self.root, artifact, &self.config);
        let command = single_test_command(&compiled, &self.config);
        let capture = new_capture_file(&self.root);
        let full = tee_command(&command, &capture);

        info!(command = %full, capture = %capture.display(), "launching single test");
        self.launcher.launch(&full, &self.root).await?;

        let captured = await_capture(&capture, &self.policy).await;
        if let Some(err) = captured.read_error {
            warn!(capture = %capture.display(), error = %err, "single test output unreadable");
            return Ok(TestRunResult::from_heuristic(
                false,
                String::new(),
                err,
                full,
                self.cwd(),
            ));
        }
        if captured.output.is_empty() {
            warn!(capture = %capture.display(), "no output captured from single test run");
        }

        let failed = output_indicates_failure(&captured.output);
        Ok(TestRunResult::from_heuristic(
            !failed,
            captured.output,
            String::new(),
            full,
            self.cwd(),
        ))
    }
}
