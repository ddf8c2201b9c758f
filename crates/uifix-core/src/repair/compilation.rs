//! FixCompilationIssues: one suite run, one fix, one verification.

use std::collections::HashSet;

use tracing::{info, warn, Instrument};

use super::fix::FixAttempt;
use super::session::RepairSession;
use super::summary::{CompilationOutcome, CompilationSummary};
use super::Orchestrator;
use crate::context::ScopedContext;
use crate::domain::error::Result;
use crate::domain::failure::extract_test_files;
use crate::failure_parser::parse_failures;
use crate::obs::{emit_workflow_finished, emit_workflow_started};
use crate::progress::ProgressReporter;

impl Orchestrator {
    /// Run the suite; on failure, fix the first parsed failure and re-run
    /// the suite once.
    ///
    /// Only a suite that cannot be started (no script, no npm) is an error.
    /// Every other ending is a [`CompilationOutcome`].
    pub async fn fix_compilation_issues(&self) -> Result<CompilationSummary> {
        let ctx = ScopedContext::root("FixCompilationIssues");
        let session = RepairSession::new();
        emit_workflow_started(&ctx.scope(), &session.id.to_string());

        let span = ctx.span();
        let summary = self
            .fix_compilation_inner(&ctx)
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

    async fn fix_compilation_inner(&self, ctx: &ScopedContext) -> Result<CompilationSummary> {
        let mut progress = ProgressReporter::new(self.progress.as_ref());

        let known: Vec<String> = self
            .discoverer
            .discover()
            .await?
            .iter()
            .map(|p| self.workspace.relative(p))
            .collect();

        progress.report(0.0, "Running UI tests for compilation issues");
        info!(scope = %ctx, "running UI tests to capture compilation failures");
        let run = self.executor.run_all().await?;

        if run.success {
            info!(scope = %ctx, "UI test run succeeded; no compilation fixes required");
            progress.report(100.0, "Compilation check complete");
            let mut summary = CompilationSummary::new(CompilationOutcome::AlreadyPassing);
            summary.compilable = known;
            return Ok(summary);
        }

        let combined = run.combined_output();
        let parsed = parse_failures(&combined);
        info!(scope = %ctx, failures = parsed.len(), "parsed failures from test output");
        progress.report(30.0, "Analyzing compiler output");

        let Some(first) = parsed.first() else {
            warn!(scope = %ctx, "tests failed but no failure could be parsed");
            progress.report(100.0, "Compilation fix aborted");
            let mut summary = CompilationSummary::new(CompilationOutcome::Unparsable);
            summary.compilable = known;
            return Ok(summary);
        };

        let mut failing: Vec<String> = Vec::new();
        for file in extract_test_files(&parsed.failures) {
            let relative = self.workspace.relative(&file);
            if !failing.contains(&relative) {
                failing.push(relative);
            }
        }
        let compilable: Vec<String> = {
            let failing_set: HashSet<&String> = failing.iter().collect();
            known
                .iter()
                .filter(|f| !failing_set.contains(f))
                .cloned()
                .collect()
        };

        let mut summary = CompilationSummary {
            outcome: CompilationOutcome::StillFailing,
            compilable,
            failing,
            targeted_failure: Some(first.title.clone()),
            fix_path: None,
        };

        progress.report(45.0, &format!("Preparing fix for \"{}\"", first.title));
        info!(scope = %ctx, failure = %first.title, "targeting first failure for automated fix");

        let manifest = self.fix_manifest(ctx);
        progress.report(55.0, "Collecting project context");

        progress.report(65.0, "Requesting fix from the generator");
        let attempt = self.apply_fix(ctx, first, &combined, &manifest).await;
        progress.report(75.0, "Applying fix");

        match attempt {
            FixAttempt::Applied { path, .. } => {
                summary.fix_path = Some(self.workspace.relative(&path));
            }
            FixAttempt::NoFixProduced => {
                progress.report(100.0, "Compilation fix aborted");
                summary.outcome = CompilationOutcome::NoFixProduced;
                return Ok(summary);
            }
            FixAttempt::WriteFailed { path, .. } => {
                progress.report(100.0, "Compilation fix aborted");
                summary.outcome = CompilationOutcome::WriteFailed;
                summary.fix_path = Some(self.workspace.relative(&path));
                return Ok(summary);
            }
        }

        progress.report(90.0, "Re-running tests to verify fix");
        info!(scope = %ctx, "re-running UI tests to verify compilation fix");
        let rerun = self.executor.run_all().await?;
        if rerun.success {
            info!(scope = %ctx, "compilation issues resolved after fix");
            summary.outcome = CompilationOutcome::Fixed;
            // a passing re-run means every known file now compiles
            summary.failing.clear();
            summary.compilable = known;
        } else {
            warn!(scope = %ctx, "tests still failing after fix");
        }
        progress.report(100.0, "Compilation fix workflow complete");
        Ok(summary)
    }
}
