//! Read-only git tools.
//!
//! These run without approval, so they are restricted to fixed subcommands
//! that cannot modify the repository.

use serde_json::{Value, json};

use crate::artifact::{Artifact, GitView};
use crate::error::ToolError;
use crate::runner::{CommandSpec, DEFAULT_COMMAND_TIMEOUT};
use crate::schema::{GitArgs, parse};
use crate::truncate::truncate_output;
use crate::{BuiltinTool, ToolContext, ToolOutput, ToolResult};

/// Shows `git status` for a workspace directory.
pub struct GitStatusTool;

/// Shows `git diff` (optionally staged) for a workspace directory.
pub struct GitDiffTool;

#[async_trait::async_trait]
impl BuiltinTool for GitStatusTool {
    fn name(&self) -> &'static str {
        "get_git_status"
    }

    fn description(&self) -> &'static str {
        "Shows the git status (branch and changed files) of the workspace. Read-only."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cwd": {
                    "type": "string",
                    "description": "Directory relative to the workspace root (default: root)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: GitArgs = parse(args)?;
        let output = run_git(ctx, args.cwd.as_deref(), &["status", "--short", "--branch"]).await?;
        Ok(git_output(GitView::Status, output, "Working tree clean."))
    }
}

#[async_trait::async_trait]
impl BuiltinTool for GitDiffTool {
    fn name(&self) -> &'static str {
        "get_git_diff"
    }

    fn description(&self) -> &'static str {
        "Shows uncommitted changes as a unified diff. Set `staged` to see only staged \
         changes. Read-only."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cwd": {
                    "type": "string",
                    "description": "Directory relative to the workspace root (default: root)"
                },
                "staged": {
                    "type": "boolean",
                    "description": "Show staged changes instead of unstaged ones"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: GitArgs = parse(args)?;
        let git_args: &[&str] = if args.staged {
            &["--no-pager", "diff", "--staged"]
        } else {
            &["--no-pager", "diff"]
        };
        let output = run_git(ctx, args.cwd.as_deref(), git_args).await?;
        Ok(git_output(GitView::Diff, output, "No changes."))
    }
}

async fn run_git(ctx: &ToolContext, cwd: Option<&str>, args: &[&str]) -> ToolResult<String> {
    let dir = ctx
        .inspector
        .sandbox()
        .resolve(cwd.unwrap_or_default(), true)
        .await?;

    let output = ctx
        .runner
        .run(&CommandSpec::program("git", args, dir.as_path()))
        .await?;

    if output.timed_out {
        return Err(ToolError::Timeout(DEFAULT_COMMAND_TIMEOUT.as_secs()));
    }
    if !output.success() {
        let stderr = output.stderr.trim();
        return Err(ToolError::ExecutionFailure {
            message: if stderr.is_empty() {
                "git failed".to_string()
            } else {
                stderr.to_string()
            },
            partial_output: output.stdout,
        });
    }
    Ok(output.stdout)
}

fn git_output(view: GitView, stdout: String, empty: &str) -> ToolOutput {
    let text = if stdout.trim().is_empty() {
        empty.to_string()
    } else {
        truncate_output(stdout)
    };
    ToolOutput::with_artifact(text.clone(), Artifact::GitOutput { view, output: text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandOutput;
    use crate::test_support::{FakeRunner, context_with_runner};

    #[tokio::test]
    async fn test_status_runs_fixed_subcommand() {
        let runner = FakeRunner::new(CommandOutput {
            stdout: "## main\n M src/lib.rs\n".to_string(),
            exit_code: Some(0),
            ..CommandOutput::default()
        });
        let (_dir, ctx) = context_with_runner(runner.clone());

        let out = GitStatusTool.execute(Value::Null, &ctx).await.unwrap();
        assert!(out.content.contains("M src/lib.rs"));
        let calls = runner.calls();
        assert_eq!(calls[0].program, "git");
        assert_eq!(calls[0].args, vec!["status", "--short", "--branch"]);
        assert!(matches!(
            out.artifact,
            Some(Artifact::GitOutput { view: GitView::Status, .. })
        ));
    }

    #[tokio::test]
    async fn test_diff_staged_flag() {
        let runner = FakeRunner::new(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        });
        let (_dir, ctx) = context_with_runner(runner.clone());

        let out = GitDiffTool
            .execute(json!({ "staged": true }), &ctx)
            .await
            .unwrap();
        assert_eq!(out.content, "No changes.");
        assert_eq!(runner.calls()[0].args, vec!["--no-pager", "diff", "--staged"]);
    }

    #[tokio::test]
    async fn test_not_a_repository() {
        let runner = FakeRunner::new(CommandOutput {
            stderr: "fatal: not a git repository\n".to_string(),
            exit_code: Some(128),
            ..CommandOutput::default()
        });
        let (_dir, ctx) = context_with_runner(runner);

        let err = GitStatusTool.execute(Value::Null, &ctx).await.unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }

    #[tokio::test]
    async fn test_cwd_escape_rejected_before_running() {
        let runner = FakeRunner::new(CommandOutput::default());
        let (_dir, ctx) = context_with_runner(runner.clone());

        let err = GitDiffTool
            .execute(json!({ "cwd": "/tmp" }), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_violation());
        assert!(runner.calls().is_empty());
    }
}
