//! A single fix attempt: load, classify, generate, write.

use std::path::PathBuf;

use tracing::{debug, error, info};

use super::Orchestrator;
use crate::classifier::classify;
use crate::context::ScopedContext;
use crate::domain::failure::{ParsedFailure, RemediationPath};
use crate::generator::{clean_generated_content, is_no_output};
use crate::manifest::ManifestContext;
use crate::obs::{emit_fix_applied, emit_fix_skipped};
use crate::prompts::{fix_failing_test_prompt, fix_runtime_failure_prompt, FixPromptInput};
use crate::scaffold::write_file;

/// Result of one fix attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixAttempt {
    /// The fix was written to `path`.
    Applied {
        path: PathBuf,
        remediation: RemediationPath,
    },
    /// The generator returned nothing usable; nothing was written.
    NoFixProduced,
    /// The fix could not be written to `path`.
    WriteFailed { path: PathBuf, reason: String },
}

impl FixAttempt {
    pub fn is_applied(&self) -> bool {
        matches!(self, FixAttempt::Applied { .. })
    }
}

impl Orchestrator {
    /// Generate and write a fix for one failure.
    ///
    /// `failing_output` is the full captured output the failure came from.
    pub(crate) async fn apply_fix(
        &self,
        ctx: &ScopedContext,
        failure: &ParsedFailure,
        failing_output: &str,
        manifest: &ManifestContext,
    ) -> FixAttempt {
        let ctx = ctx.child("FixTestFailure");
        info!(
            scope = %ctx,
            failure = %failure.title,
            file = failure.file.as_deref().unwrap_or("unknown"),
            "preparing fix"
        );

        let current_content = match failure.file.as_deref() {
            Some(file) => {
                let path = self.workspace.resolve(file);
                match tokio::fs::read_to_string(&path).await {
                    Ok(content) => {
                        debug!(scope = %ctx, path = %path.display(), chars = content.len(), "loaded current content");
                        Some(content)
                    }
                    Err(e) => {
                        error!(scope = %ctx, path = %path.display(), error = %e, "could not read failing file");
                        None
                    }
                }
            }
            None => None,
        };

        let classification = classify(failure);
        let remediation = classification.remediation();
        info!(
            scope = %ctx,
            failure_type = %classification.failure_type,
            runtime = classification.is_runtime_failure,
            compilation = classification.is_compilation_failure,
            "classified failure"
        );

        let input = FixPromptInput {
            failing_output,
            file_path: failure.file.as_deref(),
            current_content: current_content.as_deref(),
            manifest,
        };
        let prompt = match remediation {
            RemediationPath::Compilation => fix_failing_test_prompt(&input),
            RemediationPath::Runtime => fix_runtime_failure_prompt(&input),
        };

        let response = self.generator.generate_code(&prompt).await;
        let fixed = clean_generated_content(&response);
        info!(scope = %ctx, chars = fixed.len(), "received fix response");
        if is_no_output(&fixed) {
            emit_fix_skipped(&failure.title, &"generator returned no content");
            return FixAttempt::NoFixProduced;
        }

        let target = self
            .workspace
            .resolve_fix_destination(
                failure.file.as_deref(),
                &self.config.fallback_destination,
                self.chooser.as_ref(),
            )
            .await;

        match write_file(&target, &fixed).await {
            Ok(()) => {
                let relative = self.workspace.relative(&target);
                emit_fix_applied(&failure.title, &relative, remediation_label(remediation));
                FixAttempt::Applied {
                    path: target,
                    remediation,
                }
            }
            Err(e) => {
                error!(scope = %ctx, path = %target.display(), error = %e, "failed to write fix");
                emit_fix_skipped(&failure.title, &e);
                FixAttempt::WriteFailed {
                    path: target,
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn remediation_label(path: RemediationPath) -> &'static str {
    match path {
        RemediationPath::Compilation => "compilation",
        RemediationPath::Runtime => "runtime",
    }
}
