//! External tool execution with a deadline.
//!
//! ffprobe, ffmpeg and mkvextract calls are blocking; a hung tool would hang
//! the pass that invoked it, so every call goes through `run_tool`, which
//! kills the child once the timeout expires.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Poll interval while waiting on a child process.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors from running an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} did not finish within {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("{tool} exited with code {exit_code:?}: {message}")]
    Failed {
        tool: String,
        exit_code: Option<i32>,
        message: String,
    },

    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// Captured output of a finished tool.
#[derive(Debug)]
pub struct ToolOutput {
    pub tool: String,
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl ToolOutput {
    /// Turn a non-zero exit into `ToolError::Failed`.
    pub fn require_success(self) -> Result<Self, ToolError> {
        if self.status.success() {
            Ok(self)
        } else {
            Err(ToolError::Failed {
                tool: self.tool,
                exit_code: self.status.code(),
                message: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Run a command to completion, killing it if `timeout` expires.
///
/// Stdout and stderr are drained on helper threads so a chatty tool cannot
/// block on a full pipe.
pub fn run_tool(mut cmd: Command, timeout: Duration) -> Result<ToolOutput, ToolError> {
    let tool = cmd.get_program().to_string_lossy().to_string();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!("Running {:?}", cmd);

    let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
        tool: tool.clone(),
        source,
    })?;

    let io_err = |source: io::Error| ToolError::Io {
        tool: tool.clone(),
        source,
    };

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_err(io::Error::other("stdout not captured")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_err(io::Error::other("stderr not captured")))?;

    let stdout_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });
    let stderr_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait().map_err(io_err)? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!("{} timed out after {}s", tool, timeout.as_secs());
            return Err(ToolError::Timeout {
                tool,
                secs: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_reader
        .join()
        .map_err(|_| io_err(io::Error::other("stdout reader panicked")))?
        .map_err(io_err)?;
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(ToolOutput {
        tool,
        status,
        stdout,
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_spawn_error() {
        let cmd = Command::new("relqa-definitely-not-a-tool");
        let result = run_tool(cmd, Duration::from_secs(1));
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf hello"]);
        let output = run_tool(cmd, Duration::from_secs(5))
            .unwrap()
            .require_success()
            .unwrap();
        assert_eq!(output.stdout, b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_failure() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);
        let err = run_tool(cmd, Duration::from_secs(5))
            .unwrap()
            .require_success()
            .unwrap_err();
        match err {
            ToolError::Failed {
                exit_code, message, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn kills_on_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_tool(cmd, Duration::from_millis(100));
        assert!(matches!(result, Err(ToolError::Timeout { .. })));
    }
}
