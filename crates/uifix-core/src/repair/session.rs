//! Per-workflow mutable state.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// State of one repair workflow run. Created at workflow start and
/// dropped at the end; nothing is persisted.
#[derive(Debug, Clone)]
pub struct RepairSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Workspace-relative artifacts confirmed passing.
    passing: BTreeSet<String>,
    /// Workspace-relative artifacts whose failures were not resolved.
    unresolved: BTreeSet<String>,
    pub fixed_count: usize,
    pub total_failures: usize,
}

impl RepairSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            passing: BTreeSet::new(),
            unresolved: BTreeSet::new(),
            fixed_count: 0,
            total_failures: 0,
        }
    }

    pub fn mark_passing(&mut self, artifact: &str) {
        self.unresolved.remove(artifact);
        self.passing.insert(artifact.to_string());
    }

    pub fn mark_unresolved(&mut self, artifact: &str) {
        self.unresolved.insert(artifact.to_string());
    }

    /// Sorted passing artifacts.
    pub fn passing(&self) -> Vec<String> {
        self.passing.iter().cloned().collect()
    }

    /// Sorted unresolved artifacts.
    pub fn unresolved(&self) -> Vec<String> {
        self.unresolved.iter().cloned().collect()
    }

    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}

impl Default for RepairSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_clears_unresolved() {
        let mut session = RepairSession::new();
        session.mark_unresolved("src/ui-test/b.test.ts");
        session.mark_unresolved("src/ui-test/a.test.ts");
        session.mark_passing("src/ui-test/b.test.ts");
        assert_eq!(session.passing(), vec!["src/ui-test/b.test.ts"]);
        assert_eq!(session.unresolved(), vec!["src/ui-test/a.test.ts"]);
    }
}
