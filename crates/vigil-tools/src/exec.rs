//! Execution of human-approved commands.

use std::sync::Arc;

use tracing::{info, warn};
use vigil_approval::{ApprovalError, ApprovalRegistry, ApprovalToken, TokenRejection};
use vigil_workspace::PathSandbox;

use crate::error::{ToolError, ToolResult};
use crate::runner::{CommandRunner, CommandSpec, ShellRunner};

/// Runs a command only after its approval token has been consumed.
#[derive(Clone)]
pub struct CommandExecutor {
    approvals: Arc<ApprovalRegistry>,
    sandbox: PathSandbox,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("root", &self.sandbox.root().as_path())
            .finish_non_exhaustive()
    }
}

impl CommandExecutor {
    /// Create an executor using [`ShellRunner`] with default limits.
    #[must_use]
    pub fn new(approvals: Arc<ApprovalRegistry>, sandbox: PathSandbox) -> Self {
        Self {
            approvals,
            sandbox,
            runner: Arc::new(ShellRunner::new()),
        }
    }

    /// Replace the process runner.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Run `command` in `cwd` (the workspace root when absent).
    ///
    /// The token is consumed before anything else happens, so a failed
    /// attempt still uses it up.
    ///
    /// # Errors
    ///
    /// - [`ToolError::Approval`] (permission denied) if the token is unknown,
    ///   used, expired, or was issued for a different command
    /// - [`ToolError::Workspace`] if `cwd` escapes the workspace
    /// - [`ToolError::ExecutionFailure`] for non-zero exit, timeout, or spawn
    ///   failure, carrying whatever output was captured
    pub async fn execute(&self, command: &str, token: &ApprovalToken, cwd: Option<&str>) -> ToolResult<String> {
        let approved = self.approvals.validate_and_consume(token)?;
        if approved != command {
            warn!(
                approved = %approved,
                submitted = %command,
                "Token refused: issued for a different command"
            );
            return Err(ApprovalError::PermissionDenied(TokenRejection::CommandMismatch).into());
        }

        let dir = self.sandbox.resolve(cwd.unwrap_or_default(), true).await?;
        info!(command = %command, cwd = %dir.relative(), "Executing approved command");

        let output = self
            .runner
            .run(&CommandSpec::shell(command, dir.as_path()))
            .await
            .map_err(|e| ToolError::ExecutionFailure {
                message: e.to_string(),
                partial_output: String::new(),
            })?;

        let combined = output.combined();
        if output.success() {
            return Ok(combined);
        }

        let message = if output.timed_out {
            "command timed out".to_string()
        } else {
            match output.exit_code {
                Some(code) => format!("command exited with status {code}"),
                None => "command terminated by signal".to_string(),
            }
        };
        warn!(command = %command, reason = %message, "Approved command failed");
        Err(ToolError::ExecutionFailure {
            message,
            partial_output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandOutput;
    use crate::test_support::{FakeRunner, sandbox};
    use tempfile::TempDir;
    use vigil_approval::ActionKind;

    fn ok_output(stdout: &str) -> CommandOutput {
        CommandOutput {
            stdout: stdout.to_string(),
            exit_code: Some(0),
            ..CommandOutput::default()
        }
    }

    fn setup(runner: Arc<FakeRunner>) -> (TempDir, Arc<ApprovalRegistry>, CommandExecutor) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("web")).unwrap();
        let approvals = Arc::new(ApprovalRegistry::new());
        let executor = CommandExecutor::new(Arc::clone(&approvals), sandbox(&dir)).with_runner(runner);
        (dir, approvals, executor)
    }

    fn grant(approvals: &ApprovalRegistry, command: &str) -> ApprovalToken {
        let id = approvals
            .request(ActionKind::TerminalRun, "test", command)
            .unwrap();
        approvals.grant(&id).unwrap().token
    }

    #[tokio::test]
    async fn test_runs_with_valid_token() {
        let runner = FakeRunner::new(ok_output("passed\n"));
        let (_dir, approvals, executor) = setup(Arc::clone(&runner));
        let token = grant(&approvals, "npm test");

        let out = executor.execute("npm test", &token, None).await.unwrap();
        assert_eq!(out, "passed\n");
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_nothing_runs_without_token() {
        let runner = FakeRunner::new(ok_output(""));
        let (_dir, _approvals, executor) = setup(Arc::clone(&runner));

        let err = executor
            .execute("rm -rf /", &ApprovalToken::from("forged"), None)
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let runner = FakeRunner::new(ok_output("ok"));
        let (_dir, approvals, executor) = setup(Arc::clone(&runner));
        let token = grant(&approvals, "ls");

        executor.execute("ls", &token, None).await.unwrap();
        let err = executor.execute("ls", &token, None).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_command_mismatch_denied_and_consumes() {
        let runner = FakeRunner::new(ok_output(""));
        let (_dir, approvals, executor) = setup(Arc::clone(&runner));
        let token = grant(&approvals, "npm test");

        let err = executor.execute("rm -rf .", &token, None).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::Approval(ApprovalError::PermissionDenied(TokenRejection::CommandMismatch))
        ));
        assert!(executor.execute("npm test", &token, None).await.is_err());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cwd_resolved_in_sandbox() {
        let runner = FakeRunner::new(ok_output(""));
        let (dir, approvals, executor) = setup(Arc::clone(&runner));

        let token = grant(&approvals, "ls");
        executor.execute("ls", &token, Some("web")).await.unwrap();
        let expected = std::fs::canonicalize(dir.path().join("web")).unwrap();
        assert_eq!(runner.calls()[0].cwd, expected);

        let token = grant(&approvals, "ls");
        let err = executor.execute("ls", &token, Some("../")).await.unwrap_err();
        assert!(err.is_violation());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_carries_partial_output() {
        let runner = FakeRunner::new(CommandOutput {
            stdout: "1 passing\n".to_string(),
            stderr: "1 failing\n".to_string(),
            exit_code: Some(1),
            ..CommandOutput::default()
        });
        let (_dir, approvals, executor) = setup(runner);
        let token = grant(&approvals, "npm test");

        let err = executor.execute("npm test", &token, None).await.unwrap_err();
        assert!(err.to_string().contains("status 1"));
        assert_eq!(err.partial_output(), Some("1 passing\n1 failing\n"));
    }

    #[tokio::test]
    async fn test_timeout_is_execution_failure() {
        let runner = FakeRunner::new(CommandOutput {
            stdout: "started".to_string(),
            timed_out: true,
            ..CommandOutput::default()
        });
        let (_dir, approvals, executor) = setup(runner);
        let token = grant(&approvals, "sleep 100");

        let err = executor.execute("sleep 100", &token, None).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert_eq!(err.partial_output(), Some("started"));
    }
}
