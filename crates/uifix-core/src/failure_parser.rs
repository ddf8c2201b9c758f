//! Failure parser for captured UI test output.
//!
//! Recovers structured [`ParsedFailure`] records from mixed Mocha/ExTester
//! failure blocks, TypeScript compiler diagnostics, WebDriver errors and
//! stack traces. The scan is a single left-to-right pass over sanitized
//! lines with at most one in-progress failure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::failure::{
    ParseResult, ParsedFailure, DEFAULT_FAILURE_TITLE, FALLBACK_FAILURE_TITLE,
};
use crate::sanitize::sanitize;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("parser pattern is valid")
}

/// `src/x.ts(10,5): error TS2322: message`
static COMPILER_DIAGNOSTIC: Lazy<Regex> = Lazy::new(|| {
    re(r"^([^()]+\.(?:ts|tsx|js|jsx))\((\d+),(\d+)\):\s+error\s+[A-Za-z]*\d+:\s+(.*)$")
});

/// `1) Suite should do X` / `2) "after all" hook in "{root}":`
static FAILURE_HEADER: Lazy<Regex> = Lazy::new(|| re(r"^\d+\)\s+(.*?)(?::\s*)?$"));

static KNOWN_ERROR: Lazy<Regex> = Lazy::new(|| {
    re(r"^(?:Error|AssertionError|TypeError|ReferenceError|RangeError|TimeoutError|SessionNotCreatedError):")
});

static NAMED_ERROR: Lazy<Regex> = Lazy::new(|| re(r"^[A-Za-z][A-Za-z0-9]*Error:"));

static TIMEOUT_PHRASE: Lazy<Regex> = Lazy::new(|| re(r"^Timeout of \d+ms exceeded"));

static UNHANDLED_PHRASE: Lazy<Regex> = Lazy::new(|| re(r"^Unhandled"));

/// `(path/to/test.ts:12:3)` inside a stack frame.
static FILE_IN_PARENS: Lazy<Regex> =
    Lazy::new(|| re(r"\(([^()]+\.(?:ts|tsx|js|jsx)):\d+:\d+\)"));

/// `path/to/test.ts:12:3` anywhere in the line.
static FILE_BARE: Lazy<Regex> =
    Lazy::new(|| re(r"\b([^()\s]+\.(?:ts|tsx|js|jsx)):(\d+):(\d+)\b"));

/// Coarse signature used only by the empty-result fallback.
static FALLBACK_SIGNATURE: Lazy<Regex> =
    Lazy::new(|| re(r"(error TS\d+|[A-Za-z][A-Za-z0-9]*Error:|Timeout|Unhandled)"));

/// Whether a trimmed line is an error-message line.
pub fn is_error_line(trimmed: &str) -> bool {
    KNOWN_ERROR.is_match(trimmed)
        || NAMED_ERROR.is_match(trimmed)
        || TIMEOUT_PHRASE.is_match(trimmed)
        || UNHANDLED_PHRASE.is_match(trimmed)
}

/// Extract the source path a line points at, preferring a parenthesized
/// stack-frame location over a bare one.
pub fn file_location(trimmed: &str) -> Option<&str> {
    FILE_IN_PARENS
        .captures(trimmed)
        .or_else(|| FILE_BARE.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Single-pass scan state.
#[derive(Debug, Default)]
struct FailureScan {
    failures: Vec<ParsedFailure>,
    current: Option<ParsedFailure>,
}

impl FailureScan {
    fn finalize_current(&mut self) {
        if let Some(failure) = self.current.take() {
            self.failures.push(failure);
        }
    }

    fn current_or_default(&mut self) -> &mut ParsedFailure {
        self.current
            .get_or_insert_with(|| ParsedFailure::titled(DEFAULT_FAILURE_TITLE))
    }

    fn scan_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(caps) = COMPILER_DIAGNOSTIC.captures(trimmed) {
            self.finalize_current();
            let file = &caps[1];
            self.failures.push(
                ParsedFailure::titled(format!("{}:{}:{}", file, &caps[2], &caps[3]))
                    .with_file(file)
                    .with_message(caps[4].trim()),
            );
            return;
        }

        if let Some(caps) = FAILURE_HEADER.captures(trimmed) {
            self.finalize_current();
            self.current = Some(ParsedFailure::titled(&caps[1]));
            return;
        }

        if is_error_line(trimmed) {
            self.current_or_default().error_message = trimmed.to_string();
            return;
        }

        // A location hint does not end processing of the line: the same
        // line is usually an `at ...` frame as well.
        if let Some(file) = file_location(trimmed) {
            self.current_or_default().file = Some(file.to_string());
        }

        if trimmed.starts_with("at ") {
            self.current_or_default().push_stack_line(line);
        }
    }

    fn finish(mut self, lines: &[&str]) -> ParseResult {
        self.finalize_current();

        if self.failures.is_empty() {
            if let Some(last) = lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| FALLBACK_SIGNATURE.is_match(l))
                .last()
            {
                self.failures
                    .push(ParsedFailure::titled(FALLBACK_FAILURE_TITLE).with_message(last));
            }
        }

        ParseResult {
            failures: self.failures,
        }
    }
}

/// Parse captured test output into an ordered list of failures.
///
/// ANSI sequences are stripped first. If no failure is recognized but
/// some line carries an error/timeout/unhandled signature, a single
/// failure titled `"Unknown failing test"` is synthesized from the last
/// such line, so output that plainly indicates a failure never parses
/// to an empty result.
pub fn parse_failures(output: &str) -> ParseResult {
    let clean = sanitize(output);
    let lines: Vec<&str> = clean.lines().collect();

    let mut scan = FailureScan::default();
    for line in &lines {
        scan.scan_line(line);
    }
    scan.finish(&lines)
}
