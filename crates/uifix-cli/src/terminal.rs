//! Terminal progress output and fix-destination prompting.

use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use uifix_core::{DestinationChooser, ProgressSink, ProgressUpdate};

/// Prints each progress update as a `[ NN%] message` line on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalProgress;

impl TerminalProgress {
    pub fn line(update: &ProgressUpdate) -> String {
        format!("[{:>3}%] {}", update.percentage, update.message)
    }
}

impl ProgressSink for TerminalProgress {
    fn report(&self, update: &ProgressUpdate) {
        eprintln!("{}", Self::line(update));
    }
}

/// Always answers with the same destination.
#[derive(Debug, Clone)]
pub struct FixedDestination(pub String);

#[async_trait]
impl DestinationChooser for FixedDestination {
    async fn choose(&self, _suggestion: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Asks on stderr and reads one line from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinDestination;

#[async_trait]
impl DestinationChooser for StdinDestination {
    async fn choose(&self, suggestion: &str) -> Option<String> {
        eprint!("Where should the fix be written? [{suggestion}]: ");
        std::io::stderr().flush().ok();

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}
