//! Workspace paths and fix-destination resolution.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

/// File name used for a fix when the failure names no file.
pub const DEFAULT_FIX_FILE_NAME: &str = "ai-fix.test.ts";

/// Asks where a fix should be written when the failure names no file.
#[async_trait]
pub trait DestinationChooser: Send + Sync {
    /// `suggestion` is workspace-relative. Return a workspace-relative
    /// path (file or directory); `None` or an empty answer accepts the
    /// default location.
    async fn choose(&self, suggestion: &str) -> Option<String>;
}

/// Chooser that always accepts the default location.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDestination;

#[async_trait]
impl DestinationChooser for DefaultDestination {
    async fn choose(&self, _suggestion: &str) -> Option<String> {
        None
    }
}

/// Project root all relative paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths are kept; relative ones are joined to the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Workspace-relative display form, with `.` segments removed.
    /// Paths outside the root are returned normalized but absolute.
    pub fn relative(&self, path: impl AsRef<Path>) -> String {
        let absolute = normalize(&self.resolve(path));
        let root = normalize(&self.root);
        match absolute.strip_prefix(&root) {
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => absolute.to_string_lossy().into_owned(),
        }
    }

    /// Final path a fix is written to.
    ///
    /// A known failure file is resolved against the root. Without one,
    /// `chooser` is asked, with `fallback_dir` as the suggestion. In both
    /// cases a directory, or a missing path without an extension, gets
    /// [`default_fix_file_name`] appended.
    pub async fn resolve_fix_destination(
        &self,
        failure_file: Option<&str>,
        fallback_dir: &str,
        chooser: &dyn DestinationChooser,
    ) -> PathBuf {
        let default_name = default_fix_file_name(failure_file);

        let candidate = match failure_file {
            Some(file) => self.resolve(file),
            None => match chooser.choose(fallback_dir).await {
                Some(picked) if !picked.trim().is_empty() => self.resolve(picked.trim()),
                _ => self.resolve(fallback_dir).join(&default_name),
            },
        };

        complete_file_name(candidate, &default_name).await
    }
}

/// Basename of the failure file with `.ts` ensured, or
/// [`DEFAULT_FIX_FILE_NAME`].
pub fn default_fix_file_name(failure_file: Option<&str>) -> String {
    let base = failure_file
        .and_then(|f| Path::new(f).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FIX_FILE_NAME.to_string());
    if base.ends_with(".ts") {
        base
    } else {
        format!("{base}.ts")
    }
}

async fn complete_file_name(candidate: PathBuf, default_name: &str) -> PathBuf {
    match tokio::fs::metadata(&candidate).await {
        Ok(meta) if meta.is_dir() => candidate.join(default_name),
        Ok(_) => candidate,
        Err(_) if candidate.extension().is_none() => candidate.join(default_name),
        Err(_) => candidate,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
