//! Source-to-compiled test path mapping.

use std::path::{Path, PathBuf};

use crate::config::RunnerConfig;

fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

/// Map a test source file to the JavaScript file the build emits for it.
///
/// The artifact is made relative to `root`, leading segments it shares
/// with `root_folder` are dropped, the rest is placed under
/// `output_folder` and any `.ts` segment becomes `.js`.
pub fn compiled_path(root: &Path, artifact: &Path, config: &RunnerConfig) -> PathBuf {
    let relative = artifact.strip_prefix(root).unwrap_or(artifact);
    let relative = relative.to_string_lossy();
    let rel_segments = segments(&relative);

    let root_segments = config
        .root_folder
        .as_deref()
        .map(segments)
        .unwrap_or_default();

    let matching = root_segments
        .iter()
        .zip(rel_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = root.join(&config.output_folder);
    for segment in &rel_segments[matching..] {
        match segment.strip_suffix(".ts") {
            Some(stem) => out.push(format!("{stem}.js")),
            None => out.push(segment),
        }
    }
    out
}
