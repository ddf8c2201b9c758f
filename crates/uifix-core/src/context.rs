//! Scoped logging context threaded through workflow steps.
//!
//! A [`ScopedContext`] carries a `/`-joined label chain such as
//! `FixRuntimeFailures/src/ui-test/a.test.ts`. Children are new values;
//! the parent is never mutated.

use std::fmt;

/// Immutable scope label chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopedContext {
    labels: Vec<String>,
}

impl ScopedContext {
    /// Root context with a single label.
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            labels: vec![label.into()],
        }
    }

    /// New context with `label` appended to this chain.
    pub fn child(&self, label: impl Into<String>) -> Self {
        let mut labels = self.labels.clone();
        labels.push(label.into());
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The `/`-joined chain.
    pub fn scope(&self) -> String {
        self.labels.join("/")
    }

    /// Span tagged with the scope chain, for use with
    /// `tracing::Instrument`.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("uifix.scope", scope = %self.scope())
    }
}

impl fmt::Display for ScopedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scope())
    }
}
