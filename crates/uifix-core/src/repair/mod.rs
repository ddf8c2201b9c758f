//! Repair orchestration.
//!
//! [`Orchestrator`] owns the collaborators (executor, discoverer,
//! generator, destination chooser, progress sink) and exposes the four
//! workflows:
//! - [`Orchestrator::generate_proposals`]
//! - [`Orchestrator::fix_compilation_issues`]
//! - [`Orchestrator::fix_runtime_failures`]
//! - [`Orchestrator::run_and_fix`]
//!
//! Work is strictly sequential: one run, one fix, one verification at a
//! time.

mod compilation;
mod fix;
mod proposals;
mod runtime;
pub mod session;
pub mod summary;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::context::ScopedContext;
use crate::domain::error::Result;
use crate::executor::{TestDiscoverer, TestExecutor};
use crate::generator::Generator;
use crate::manifest::ManifestContext;
use crate::progress::{NullProgress, ProgressSink};
use crate::workspace::{DefaultDestination, DestinationChooser, Workspace};

pub use fix::FixAttempt;
pub use runtime::ArtifactOutcome;
pub use session::RepairSession;
pub use summary::{
    CompilationOutcome, CompilationSummary, ProposalOutcome, ProposalSummary, RunAndFixSummary,
    RuntimeSummary,
};

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepairConfig {
    /// Workspace-relative directory generated tests are written under.
    pub test_dir: String,
    /// Workspace-relative directory suggested when a fix has no known file.
    pub fallback_destination: String,
    /// Maximum proposals to turn into files; `None` means all.
    pub max_generated_tests: Option<usize>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            test_dir: "src/ui-test".to_string(),
            fallback_destination: "src/ui-test".to_string(),
            max_generated_tests: None,
        }
    }
}

/// Drives the generate, compile-fix and runtime-fix workflows.
pub struct Orchestrator {
    workspace: Workspace,
    executor: Arc<dyn TestExecutor>,
    discoverer: Arc<dyn TestDiscoverer>,
    generator: Arc<dyn Generator>,
    chooser: Arc<dyn DestinationChooser>,
    progress: Arc<dyn ProgressSink>,
    manifest: Option<ManifestContext>,
    config: RepairConfig,
}

impl Orchestrator {
    pub fn new(
        workspace: Workspace,
        executor: Arc<dyn TestExecutor>,
        discoverer: Arc<dyn TestDiscoverer>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            workspace,
            executor,
            discoverer,
            generator,
            chooser: Arc::new(DefaultDestination),
            progress: Arc::new(NullProgress),
            manifest: None,
            config: RepairConfig::default(),
        }
    }

    pub fn with_chooser(mut self, chooser: Arc<dyn DestinationChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Use a fixed manifest context instead of reading `package.json`.
    pub fn with_manifest(mut self, manifest: ManifestContext) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn with_config(mut self, config: RepairConfig) -> Self {
        self.config = config;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Manifest context where a missing manifest is fatal.
    fn required_manifest(&self) -> Result<ManifestContext> {
        match &self.manifest {
            Some(m) => Ok(m.clone()),
            None => ManifestContext::load(self.workspace.root()),
        }
    }

    /// Manifest context for fix prompts; a missing manifest only degrades
    /// the prompt.
    fn fix_manifest(&self, ctx: &ScopedContext) -> ManifestContext {
        self.required_manifest().unwrap_or_else(|e| {
            error!(scope = %ctx, error = %e, "failed to collect context for fix prompt");
            ManifestContext::default()
        })
    }

    /// FixCompilationIssues, then FixRuntimeFailures.
    ///
    /// An error in the first phase is returned. An error in the second is
    /// logged and recorded in the summary.
    pub async fn run_and_fix(&self) -> Result<RunAndFixSummary> {
        let ctx = ScopedContext::root("RunAndFix");
        info!(scope = %ctx, "starting compilation fix phase");
        let compilation = self.fix_compilation_issues().await?;

        info!(scope = %ctx, "starting runtime fix phase");
        let (runtime, runtime_error) = match self.fix_runtime_failures().await {
            Ok(summary) => (Some(summary), None),
            Err(e) => {
                error!(scope = %ctx, error = %e, "runtime fix phase failed");
                (None, Some(e.to_string()))
            }
        };

        Ok(RunAndFixSummary {
            compilation,
            runtime,
            runtime_error,
        })
    }
}
