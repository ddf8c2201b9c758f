//! GenerateProposals: ask for test proposals and write one file each.

use tracing::{debug, error, info, warn, Instrument};

use super::session::RepairSession;
use super::summary::{ProposalOutcome, ProposalSummary};
use super::Orchestrator;
use crate::context::ScopedContext;
use crate::domain::error::Result;
use crate::domain::proposal::{TestGenerationResult, TestProposal};
use crate::generator::{clean_generated_content, is_no_output};
use crate::manifest::ManifestContext;
use crate::obs::{emit_workflow_finished, emit_workflow_started};
use crate::progress::ProgressReporter;
use crate::prompts::{proposal_prompt, test_file_prompt};
use crate::scaffold::{
    check_name, ensure_category_dir, ensure_test_dir, placeholder_test, write_file,
};

const PROPOSALS_START: f64 = 55.0;
const PROPOSALS_END: f64 = 95.0;

/// How one proposal file ended up on disk.
enum Written {
    Generated,
    Placeholder,
    Failed,
}

impl Orchestrator {
    /// Request proposals for the workspace manifest and write one test
    /// file per proposal, up to the configured limit.
    ///
    /// A missing manifest or an unwritable test directory is an error.
    /// A proposal whose content cannot be generated gets a placeholder
    /// file and the loop continues.
    pub async fn generate_proposals(&self) -> Result<ProposalSummary> {
        let ctx = ScopedContext::root("GenerateTestProposals");
        let session = RepairSession::new();
        emit_workflow_started(&ctx.scope(), &session.id.to_string());

        let span = ctx.span();
        let summary = self.generate_proposals_inner(&ctx).instrument(span).await?;

        emit_workflow_finished(
            &ctx.scope(),
            &session.id.to_string(),
            session.elapsed_ms(),
            summary.outcome == ProposalOutcome::Completed && summary.failed.is_empty(),
        );
        Ok(summary)
    }

    async fn generate_proposals_inner(&self, ctx: &ScopedContext) -> Result<ProposalSummary> {
        let mut progress = ProgressReporter::new(self.progress.as_ref());
        let test_dir_display = self.config.test_dir.clone();

        progress.report(0.0, "Analyzing extension manifest");
        let manifest = self.required_manifest()?;
        debug!(scope = %ctx, manifest = %manifest.to_pretty_json(), "relevant manifest parts");

        progress.report(25.0, "Requesting proposal batch");
        info!(scope = %ctx, "requesting proposal list");
        let response = self.generator.generate(&proposal_prompt(&manifest)).await;

        if response.trim().is_empty() {
            warn!(scope = %ctx, "generator response was empty, skipping generation");
            progress.report(100.0, "Generation skipped: empty response");
            return Ok(ProposalSummary::ended(
                ProposalOutcome::EmptyResponse,
                test_dir_display,
            ));
        }

        progress.report(45.0, "Parsing proposal response");
        let cleaned = clean_generated_content(&response);
        let batch = match TestGenerationResult::from_json(&cleaned) {
            Ok(batch) => batch,
            Err(e) => {
                error!(scope = %ctx, error = %e, "error parsing test generation results");
                error!(scope = %ctx, raw = %response, "raw proposal response");
                progress.report(100.0, "Generation aborted");
                return Ok(ProposalSummary::ended(
                    ProposalOutcome::Unparsable,
                    test_dir_display,
                ));
            }
        };
        info!(scope = %ctx, count = batch.proposals.len(), "parsed proposals");

        let test_dir = ensure_test_dir(self.workspace.root(), &self.config.test_dir).await?;
        info!(scope = %ctx, dir = %test_dir.display(), "ensured UI test directory");
        progress.report(PROPOSALS_START, "Preparing UI test directory");

        let selected = batch.limited(self.config.max_generated_tests);
        let total_available = batch.proposals.len();
        let total = selected.len();
        if total < total_available {
            info!(scope = %ctx, processing = total, available = total_available, "applying generation limit");
        }

        let mut summary = ProposalSummary {
            outcome: ProposalOutcome::Completed,
            test_dir: test_dir_display,
            total_available,
            processed: total,
            generated: Vec::new(),
            placeholders: Vec::new(),
            failed: Vec::new(),
        };

        for (index, proposal) in selected.iter().enumerate() {
            let proposal_ctx = ctx.child(format!("Proposal:{}", proposal.test_name));
            let relative = format!(
                "{}/{}/{}",
                self.config.test_dir.trim_end_matches('/'),
                proposal.category,
                proposal.file_name()
            );

            match self
                .write_proposal(&proposal_ctx, &test_dir, proposal, &manifest)
                .await
            {
                Written::Generated => summary.generated.push(relative),
                Written::Placeholder => summary.placeholders.push(relative),
                Written::Failed => summary.failed.push(relative),
            }

            progress.report_within(
                PROPOSALS_START,
                PROPOSALS_END,
                index + 1,
                total,
                &format!("Writing {}", proposal.file_name()),
            );
        }

        progress.report(100.0, "Test generation workflow complete");
        info!(
            scope = %ctx,
            generated = summary.generated.len(),
            total = total,
            "finished generating tests"
        );
        Ok(summary)
    }

    async fn write_proposal(
        &self,
        ctx: &ScopedContext,
        test_dir: &std::path::Path,
        proposal: &TestProposal,
        manifest: &ManifestContext,
    ) -> Written {
        info!(scope = %ctx, category = %proposal.category, "generating test");

        if let Err(e) = check_name(&proposal.test_name) {
            error!(scope = %ctx, error = %e, "rejected test name");
            return Written::Failed;
        }
        let category_dir = match ensure_category_dir(test_dir, &proposal.category).await {
            Ok(dir) => dir,
            Err(e) => {
                error!(scope = %ctx, error = %e, "could not create category directory");
                return Written::Failed;
            }
        };
        let path = category_dir.join(proposal.file_name());

        let response = self
            .generator
            .generate_code(&test_file_prompt(proposal, manifest))
            .await;
        let content = clean_generated_content(&response);

        if !is_no_output(&content) {
            match write_file(&path, &content).await {
                Ok(()) => {
                    info!(scope = %ctx, chars = content.len(), "generated test file");
                    return Written::Generated;
                }
                Err(e) => error!(scope = %ctx, error = %e, "failed to write generated content"),
            }
        } else {
            error!(scope = %ctx, "failed to generate content");
        }

        match write_file(&path, &placeholder_test(&proposal.test_name)).await {
            Ok(()) => {
                warn!(scope = %ctx, file = %proposal.file_name(), "created empty fallback test file");
                Written::Placeholder
            }
            Err(e) => {
                error!(scope = %ctx, error = %e, "failed to write fallback test file");
                Written::Failed
            }
        }
    }
}
