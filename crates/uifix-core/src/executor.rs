//! Test execution and discovery ports.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::run::TestRunResult;

/// Runs the project's UI tests.
#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// Run the whole suite. Success comes from the exit code.
    async fn run_all(&self) -> Result<TestRunResult>;

    /// Run one test artifact. Success may be a heuristic; check
    /// [`TestRunResult::verdict`].
    async fn run_one(&self, artifact: &Path) -> Result<TestRunResult>;
}

/// Enumerates test artifacts.
#[async_trait]
pub trait TestDiscoverer: Send + Sync {
    /// Absolute, de-duplicated paths in lexicographic order.
    async fn discover(&self) -> Result<Vec<PathBuf>>;
}
