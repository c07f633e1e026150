//! Subprocess execution under time and output limits.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ToolResult;
use crate::truncate::truncate_at_char_boundary;

/// Wall-clock ceiling for one command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured output ceiling, in bytes.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// How long to wait for pipes to drain after the process is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// A process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: PathBuf,
}

impl CommandSpec {
    /// Run `command` through the platform shell.
    #[must_use]
    pub fn shell(command: &str, cwd: impl Into<PathBuf>) -> Self {
        #[cfg(windows)]
        let (program, flag) = ("cmd", "/C");
        #[cfg(not(windows))]
        let (program, flag) = ("sh", "-c");
        Self {
            program: program.to_string(),
            args: vec![flag.to_string(), command.to_string()],
            cwd: cwd.into(),
        }
    }

    /// Run `program` directly with `args`.
    #[must_use]
    pub fn program(program: &str, args: &[&str], cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            cwd: cwd.into(),
        }
    }
}

/// What a process produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Exit code; `None` if killed or terminated by a signal.
    pub exit_code: Option<i32>,
    /// The process was killed for exceeding the timeout.
    pub timed_out: bool,
    /// Output beyond the capture ceiling was discarded.
    pub truncated: bool,
}

impl CommandOutput {
    /// Exited with status zero within the time limit.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Stdout followed by stderr.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Runs processes. The production implementation is [`ShellRunner`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion (or until a limit is hit).
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be started. Non-zero
    /// exits and timeouts are reported in [`CommandOutput`].
    async fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput>;
}

/// Runs processes with `tokio::process`, enforcing a timeout and an output cap.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Duration,
    max_output_bytes: usize,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl ShellRunner {
    /// Create a runner with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the output cap.
    #[must_use]
    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }
}

#[derive(Debug, Default)]
struct Capture {
    bytes: Vec<u8>,
    overflowed: bool,
}

type SharedCapture = Arc<Mutex<Capture>>;

fn lock(capture: &SharedCapture) -> std::sync::MutexGuard<'_, Capture> {
    capture.lock().unwrap_or_else(|e| {
        warn!("Output capture lock poisoned, recovering");
        e.into_inner()
    })
}

/// Read `reader` to EOF, keeping at most `cap` bytes. Excess is drained and dropped.
async fn capture<R: AsyncRead + Unpin>(mut reader: R, sink: SharedCapture, cap: usize) {
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let mut guard = lock(&sink);
                let room = cap.saturating_sub(guard.bytes.len());
                let keep = n.min(room);
                guard.bytes.extend_from_slice(&chunk[..keep]);
                if keep < n {
                    guard.overflowed = true;
                }
            },
        }
    }
}

fn take(sink: &SharedCapture) -> (String, bool) {
    let guard = lock(sink);
    (String::from_utf8_lossy(&guard.bytes).into_owned(), guard.overflowed)
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput> {
        debug!(program = %spec.program, cwd = %spec.cwd.display(), "Spawning command");

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let out_sink = SharedCapture::default();
        let err_sink = SharedCapture::default();
        let readers = [
            child
                .stdout
                .take()
                .map(|r| tokio::spawn(capture(r, Arc::clone(&out_sink), self.max_output_bytes))),
            child
                .stderr
                .take()
                .map(|r| tokio::spawn(capture(r, Arc::clone(&err_sink), self.max_output_bytes))),
        ];

        let (exit_code, timed_out) = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => (status?.code(), false),
            Err(_) => {
                warn!(
                    program = %spec.program,
                    timeout_secs = self.timeout.as_secs(),
                    "Command timed out, killing"
                );
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed-out command");
                }
                (None, true)
            },
        };

        // Grandchildren may keep the pipes open; don't wait on them forever.
        for handle in readers.into_iter().flatten() {
            let abort = handle.abort_handle();
            if tokio::time::timeout(DRAIN_GRACE, handle).await.is_err() {
                abort.abort();
            }
        }

        let (stdout, out_overflow) = take(&out_sink);
        let (stderr, err_overflow) = take(&err_sink);
        let mut output = CommandOutput {
            stdout,
            stderr,
            exit_code,
            timed_out,
            truncated: out_overflow || err_overflow,
        };

        // The cap applies to both streams together.
        let stdout_len = output.stdout.len();
        if stdout_len.saturating_add(output.stderr.len()) > self.max_output_bytes {
            let room = self.max_output_bytes.saturating_sub(stdout_len);
            output.stderr = truncate_at_char_boundary(&output.stderr, room);
            output.truncated = true;
        }

        debug!(
            program = %spec.program,
            exit_code = ?output.exit_code,
            timed_out = output.timed_out,
            truncated = output.truncated,
            "Command finished"
        );
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_echo() {
        let dir = TempDir::new().unwrap();
        let output = ShellRunner::new()
            .run(&CommandSpec::shell("echo hello", dir.path()))
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_exit_code_and_stderr() {
        let dir = TempDir::new().unwrap();
        let output = ShellRunner::new()
            .run(&CommandSpec::shell("echo oops >&2; exit 3", dir.path()))
            .await
            .unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr.trim(), "oops");
        assert_eq!(output.combined().trim(), "oops");
    }

    #[tokio::test]
    async fn test_runs_in_cwd() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let output = ShellRunner::new()
            .run(&CommandSpec::shell("ls", dir.path()))
            .await
            .unwrap();
        assert!(output.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_timeout_kills() {
        let dir = TempDir::new().unwrap();
        let runner = ShellRunner::new().with_timeout(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let output = runner
            .run(&CommandSpec::shell("echo before; exec sleep 5", dir.path()))
            .await
            .unwrap();
        assert!(output.timed_out);
        assert!(!output.success());
        assert!(output.stdout.contains("before"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_output_cap() {
        let dir = TempDir::new().unwrap();
        let runner = ShellRunner::new().with_max_output_bytes(1000);
        let output = runner
            .run(&CommandSpec::shell("head -c 5000 /dev/zero | tr '\\0' 'a'", dir.path()))
            .await
            .unwrap();
        assert!(output.success());
        assert!(output.truncated);
        assert_eq!(output.stdout.len(), 1000);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_error() {
        let dir = TempDir::new().unwrap();
        let result = ShellRunner::new()
            .run(&CommandSpec::program("definitely-not-a-real-binary-xyz", &[], dir.path()))
            .await;
        assert!(result.is_err());
    }
}
