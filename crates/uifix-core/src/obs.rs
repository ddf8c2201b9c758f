//! Structured lifecycle events for repair workflows.
//!
//! Events are plain `info!`/`warn!` records with an `event` field, so they
//! can be filtered with `RUST_LOG` and read back from JSON logs.

use tracing::{info, warn};

pub fn emit_workflow_started(workflow: &str, session_id: &str) {
    info!(event = "workflow.started", workflow = %workflow, session_id = %session_id);
}

/// Emit event: workflow finished with duration and overall success.
pub fn emit_workflow_finished(workflow: &str, session_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "workflow.finished",
        workflow = %workflow,
        session_id = %session_id,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: one test artifact reached a terminal state.
pub fn emit_artifact_processed(artifact: &str, outcome: &str, fix_attempts: usize) {
    info!(
        event = "artifact.processed",
        artifact = %artifact,
        outcome = %outcome,
        fix_attempts = fix_attempts,
    );
}

pub fn emit_fix_applied(failure_title: &str, target: &str, remediation: &str) {
    info!(
        event = "fix.applied",
        failure = %failure_title,
        target = %target,
        remediation = %remediation,
    );
}

/// Emit event: a fix attempt ended without writing anything (warning level).
pub fn emit_fix_skipped(failure_title: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "fix.skipped", failure = %failure_title, reason = %reason);
}
