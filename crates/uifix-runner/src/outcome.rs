//! Pass/fail verdict from captured text.
//!
//! Used where no exit code is available. Absence of a known failure
//! phrase counts as success, so failing output that matches none of the
//! patterns below is reported as passing.

use once_cell::sync::Lazy;
use regex::RegexSet;

static FAILURE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\d+\s+failing",
        r"AssertionError:",
        r"Error:",
        r"FAILED",
        r"FAIL",
        r"Test failed",
        r"Test failure",
        r"Expected.*but got",
        r"Expected.*to include",
        r"Expected.*to be",
    ])
    .expect("failure patterns are valid")
});

/// Whether `output` contains any known failure phrase.
pub fn output_indicates_failure(output: &str) -> bool {
    FAILURE_PATTERNS.is_match(output)
}
