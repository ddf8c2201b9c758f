//! Shell subprocess execution with incremental output capture.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};
use uifix_core::{Result, UifixError};

/// Exit status `sh` reports when the command itself cannot be found.
const SHELL_NOT_FOUND: i32 = 127;

/// Captured result of one shell invocation.
#[derive(Debug, Clone)]
pub struct ShellOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Whether the shell reported that the program was not on PATH.
    pub fn command_not_found(&self) -> bool {
        self.exit_code == Some(SHELL_NOT_FOUND)
    }
}

#[derive(Clone, Copy)]
enum Channel {
    Stdout,
    Stderr,
}

/// Base `sh -c` command with CI mode enabled.
pub fn shell(command: &str, cwd: &Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(cwd).env("CI", "1");
    cmd
}

/// Run `command` through `sh -c` in `cwd`, streaming each output line to
/// the log while accumulating it.
///
/// With a `timeout`, the child is killed once the limit elapses and
/// [`UifixError::CommandFailed`] is returned.
pub async fn run_shell(command: &str, cwd: &Path, timeout: Option<Duration>) -> Result<ShellOutput> {
    let start = Instant::now();

    let mut child = shell(command, cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(command, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let collect = async {
        futures::try_join!(
            drain(stdout, Channel::Stdout),
            drain(stderr, Channel::Stderr),
            child.wait(),
        )
    };

    let (stdout, stderr, status) = match timeout {
        Some(limit) => tokio::time::timeout(limit, collect).await.map_err(|_| {
            UifixError::CommandFailed(format!(
                "'{}' timed out after {} seconds",
                command,
                limit.as_secs()
            ))
        })??,
        None => collect.await?,
    };

    Ok(ShellOutput {
        exit_code: status.code(),
        stdout,
        stderr,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

async fn drain<R>(reader: Option<R>, channel: Channel) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(String::new());
    };

    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    let mut buf = String::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_end_matches(['\n', '\r']);
        match channel {
            Channel::Stdout => debug!(target: "uifix.process", "{}", line),
            Channel::Stderr => warn!(target: "uifix.process", "{}", line),
        }
        buf.push_str(line);
        buf.push('\n');
    }
    Ok(buf)
}

pub(crate) fn spawn_error(command: &str, err: std::io::Error) -> UifixError {
    if err.kind() == std::io::ErrorKind::NotFound {
        UifixError::CommandNotFound {
            command: command.to_string(),
        }
    } else {
        UifixError::CommandFailed(format!("{command}: {err}"))
    }
}
