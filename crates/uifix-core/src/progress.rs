//! Monotonic progress tracking.
//!
//! Workflows report absolute target percentages; [`ProgressReporter`]
//! turns them into non-negative increments for a [`ProgressSink`], so the
//! percentage a host observes never decreases and never passes 100.

use serde::{Deserialize, Serialize};

/// One update delivered to a progress sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub message: String,
    /// Points added by this update; zero for a repeated or backward target.
    pub increment: u8,
    /// Percentage after applying `increment`.
    pub percentage: u8,
}

/// Receiver of progress updates (a notification bar, a terminal line, ...).
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _update: &ProgressUpdate) {}
}

/// Saturating, non-decreasing percentage tracker bound to a sink.
pub struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
    current: u8,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, current: 0 }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    /// Move toward `target` percent (clamped to 0..=100).
    ///
    /// A target above the current value advances by the difference. Any
    /// other target still emits the message, suffixed with the current
    /// percentage, with a zero increment.
    pub fn report(&mut self, target: f64, message: &str) {
        let target = if target.is_nan() {
            0
        } else {
            target.clamp(0.0, 100.0).round() as u8
        };

        let update = if target > self.current {
            let increment = target - self.current;
            self.current = target;
            ProgressUpdate {
                message: message.to_string(),
                increment,
                percentage: self.current,
            }
        } else {
            ProgressUpdate {
                message: format!("{} ({}%)", message, self.current),
                increment: 0,
                percentage: self.current,
            }
        };
        self.sink.report(&update);
    }

    /// Report a position inside a `start..end` band, `index` of `total`
    /// items done.
    pub fn report_within(&mut self, start: f64, end: f64, index: usize, total: usize, message: &str) {
        let fraction = if total == 0 {
            1.0
        } else {
            index as f64 / total as f64
        };
        self.report(start + (end - start) * fraction, message);
    }
}
