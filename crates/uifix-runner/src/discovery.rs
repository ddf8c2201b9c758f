//! Test artifact discovery by glob.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use uifix_core::{Result, TestDiscoverer, UifixError};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;

/// Finds test files under a workspace root matching include globs and
/// not matching exclude globs. Results are absolute, de-duplicated and
/// sorted.
#[derive(Debug, Clone)]
pub struct GlobDiscoverer {
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
}

impl GlobDiscoverer {
    pub fn new(root: impl Into<PathBuf>, config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            include: build_globset(&config.patterns)?,
            exclude: build_globset(&config.exclude)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        // Directory excludes like `node_modules/**` should prune the
        // directory itself, not just its children.
        self.exclude.is_match(relative) || self.exclude.is_match(relative.join("_"))
    }

    /// Blocking walk; see [`TestDiscoverer::discover`].
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(UifixError::Discovery(format!(
                "workspace root {} is not a directory",
                self.root.display()
            )));
        }

        let mut found = BTreeSet::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| match entry.path().strip_prefix(&self.root) {
                Ok(rel) if rel.as_os_str().is_empty() => true,
                Ok(rel) => !self.is_excluded(rel),
                Err(_) => true,
            })
            .filter_map(|e| e.ok());

        for entry in walker {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if self.include.is_match(relative) {
                found.insert(entry.path().to_path_buf());
            }
        }

        debug!(root = %self.root.display(), count = found.len(), "test artifacts discovered");
        Ok(found.into_iter().collect())
    }
}

#[async_trait]
impl TestDiscoverer for GlobDiscoverer {
    async fn discover(&self) -> Result<Vec<PathBuf>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.scan())
            .await
            .map_err(|e| UifixError::Discovery(e.to_string()))?
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| UifixError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| UifixError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}
