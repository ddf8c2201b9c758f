//! Terminal control sequence stripping for captured test output.

use once_cell::sync::Lazy;
use regex::Regex;

/// ANSI CSI sequence: ESC `[`, parameter bytes, intermediate bytes, final byte.
static CSI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("CSI pattern is valid"));

/// Remove ANSI CSI escape sequences; every other byte passes through.
///
/// Removal is repeated until nothing matches, so a sequence that only
/// forms after an inner one is removed (`ESC ESC[0m [0m`) is stripped too
/// and the function is idempotent.
pub fn sanitize(raw: &str) -> String {
    let mut current = CSI.replace_all(raw, "").into_owned();
    while CSI.is_match(&current) {
        current = CSI.replace_all(&current, "").into_owned();
    }
    current
}
