//! FixRuntimeFailures: per-artifact run, fix and verify.
//!
//! Each artifact goes through a small state machine:
//!
//! ```text
//! Scanning ──pass──────────────────────────────▶ Passed
//!    │ ──no runtime-routed failure─────────────▶ Skipped
//!    ▼
//! Fixing ──queue empty─────────────────────────▶ Exhausted
//!    │ ▲ fix not applied / verification failed
//!    ▼ │
//! Verifying ──pass─────────────────────────────▶ Resolved
//! ```
//!
//! The number of fix attempts is bounded by the runtime-routed failures
//! parsed from the first run, and the first successful verification ends
//! the artifact.

use std::collections::VecDeque;
use std::path::Path;

use tracing::{info, warn, Instrument};

use super::session::RepairSession;
use super::summary::RuntimeSummary;
use super::Orchestrator;
use crate::classifier::classify;
use crate::context::ScopedContext;
use crate::domain::error::Result;
use crate::domain::failure::{ParsedFailure, RemediationPath};
use crate::domain::run::TestRunResult;
use crate::failure_parser::parse_failures;
use crate::manifest::ManifestContext;
use crate::obs::{emit_artifact_processed, emit_workflow_finished, emit_workflow_started};
use crate::progress::ProgressReporter;

const PROCESSING_START: f64 = 20.0;
const PROCESSING_END: f64 = 95.0;

/// Terminal state of one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// Passed on the first run.
    Passed,
    /// Failed, but no failure was routed to the runtime path.
    Skipped,
    /// A fix was verified by a passing re-run.
    Resolved,
    /// Every runtime failure was tried without a passing re-run.
    Exhausted,
}

impl ArtifactOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactOutcome::Passed => "passed",
            ArtifactOutcome::Skipped => "skipped",
            ArtifactOutcome::Resolved => "resolved",
            ArtifactOutcome::Exhausted => "exhausted",
        }
    }
}

enum ArtifactState {
    Scanning,
    Fixing {
        pending: VecDeque<ParsedFailure>,
        output: String,
    },
    Verifying {
        pending: VecDeque<ParsedFailure>,
        output: String,
    },
    Done(ArtifactOutcome),
}

impl Orchestrator {
    /// Run every discovered artifact on its own and try to fix its runtime
    /// failures, verifying each fix by re-running the artifact.
    pub async fn fix_runtime_failures(&self) -> Result<RuntimeSummary> {
        let ctx = ScopedContext::root("FixRuntimeFailures");
        let mut session = RepairSession::new();
        emit_workflow_started(&ctx.scope(), &session.id.to_string());

        let span = ctx.span();
        let summary = self
            .fix_runtime_inner(&ctx, &mut session)
            .instrument(span)
            .await?;

        emit_workflow_finished(
            &ctx.scope(),
            &session.id.to_string(),
            session.elapsed_ms(),
            summary.is_success(),
        );
        Ok(summary)
    }

    async fn fix_runtime_inner(
        &self,
        ctx: &ScopedContext,
        session: &mut RepairSession,
    ) -> Result<RuntimeSummary> {
        let mut progress = ProgressReporter::new(self.progress.as_ref());
        progress.report(0.0, "Discovering UI test files");

        let artifacts = self.discoverer.discover().await?;
        info!(scope = %ctx, count = artifacts.len(), "discovered test files");

        if artifacts.is_empty() {
            warn!(scope = %ctx, "no test files discovered; nothing to fix");
            progress.report(100.0, "Runtime fix cancelled: no test files discovered");
            return Ok(RuntimeSummary::default());
        }

        let manifest = self.fix_manifest(ctx);
        progress.report(15.0, "Loading extension context");

        let total = artifacts.len();
        let mut skipped = Vec::new();
        for (index, artifact) in artifacts.iter().enumerate() {
            let relative = self.workspace.relative(artifact);
            let name = artifact
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| relative.clone());
            progress.report_within(
                PROCESSING_START,
                PROCESSING_END,
                index,
                total,
                &format!("Processing {name}"),
            );

            let artifact_ctx = ctx.child(relative.clone());
            let (outcome, attempts) = self
                .process_artifact(&artifact_ctx, artifact, &relative, &manifest, session)
                .instrument(artifact_ctx.span())
                .await;

            match outcome {
                ArtifactOutcome::Passed | ArtifactOutcome::Resolved => {
                    session.mark_passing(&relative)
                }
                ArtifactOutcome::Exhausted => session.mark_unresolved(&relative),
                ArtifactOutcome::Skipped => skipped.push(relative.clone()),
            }
            emit_artifact_processed(&relative, outcome.as_str(), attempts);

            progress.report_within(
                PROCESSING_START,
                PROCESSING_END,
                index + 1,
                total,
                &format!("Processed {}/{} test files", index + 1, total),
            );
        }

        info!(
            scope = %ctx,
            fixed = session.fixed_count,
            failures_found = session.total_failures,
            "runtime fix workflow finished"
        );
        if session.fixed_count == 0 {
            warn!(scope = %ctx, "no runtime failures were fixed during this run");
        }
        progress.report(100.0, "Runtime fix workflow complete");

        Ok(RuntimeSummary {
            discovered: total,
            passing: session.passing(),
            unresolved: session.unresolved(),
            skipped,
            fixed_count: session.fixed_count,
            total_failures: session.total_failures,
        })
    }

    async fn run_artifact(&self, ctx: &ScopedContext, artifact: &Path) -> TestRunResult {
        match self.executor.run_one(artifact).await {
            Ok(result) => {
                info!(
                    scope = %ctx,
                    success = result.success,
                    heuristic = result.is_heuristic(),
                    "completed run"
                );
                result
            }
            Err(e) => {
                warn!(scope = %ctx, error = %e, "test run could not be completed");
                TestRunResult::errored(
                    e.to_string(),
                    artifact.display().to_string(),
                    self.workspace.root().display().to_string(),
                )
            }
        }
    }

    /// Drive one artifact to a terminal state. Returns the outcome and the
    /// number of fix attempts made.
    async fn process_artifact(
        &self,
        ctx: &ScopedContext,
        artifact: &Path,
        relative: &str,
        manifest: &ManifestContext,
        session: &mut RepairSession,
    ) -> (ArtifactOutcome, usize) {
        let mut attempts = 0;
        let mut state = ArtifactState::Scanning;

        loop {
            state = match state {
                ArtifactState::Scanning => {
                    let run = self.run_artifact(ctx, artifact).await;
                    if run.success {
                        info!(scope = %ctx, "test file passed; no fixes required");
                        ArtifactState::Done(ArtifactOutcome::Passed)
                    } else {
                        let output = run.combined_output();
                        let pending: VecDeque<ParsedFailure> = parse_failures(&output)
                            .failures
                            .into_iter()
                            .filter(|f| classify(f).remediation() == RemediationPath::Runtime)
                            .map(|mut f| {
                                if f.file.is_none() {
                                    f.file = Some(relative.to_string());
                                }
                                f
                            })
                            .collect();

                        if pending.is_empty() {
                            info!(scope = %ctx, "no runtime failures in parsed output; skipping");
                            ArtifactState::Done(ArtifactOutcome::Skipped)
                        } else {
                            session.total_failures += pending.len();
                            info!(scope = %ctx, count = pending.len(), "detected runtime failures");
                            ArtifactState::Fixing { pending, output }
                        }
                    }
                }

                ArtifactState::Fixing {
                    mut pending,
                    output,
                } => match pending.pop_front() {
                    None => ArtifactState::Done(ArtifactOutcome::Exhausted),
                    Some(failure) => {
                        attempts += 1;
                        info!(scope = %ctx, failure = %failure.title, "attempting fix");
                        let attempt = self.apply_fix(ctx, &failure, &output, manifest).await;
                        if attempt.is_applied() {
                            session.fixed_count += 1;
                            ArtifactState::Verifying { pending, output }
                        } else {
                            ArtifactState::Fixing { pending, output }
                        }
                    }
                },

                ArtifactState::Verifying { pending, output } => {
                    info!(scope = %ctx, "re-running file to verify fix");
                    let verify = self.run_artifact(ctx, artifact).await;
                    if verify.success {
                        info!(scope = %ctx, "verification run succeeded");
                        ArtifactState::Done(ArtifactOutcome::Resolved)
                    } else {
                        warn!(scope = %ctx, "verification run still failing; trying next failure");
                        ArtifactState::Fixing { pending, output }
                    }
                }

                ArtifactState::Done(outcome) => return (outcome, attempts),
            };
        }
    }
}
