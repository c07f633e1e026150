//! Execute command tool.
//!
//! The model cannot run anything itself. This tool only records a pending
//! approval; the command runs later through [`crate::CommandExecutor`] once a
//! human has granted it.

use serde_json::{Value, json};
use tracing::info;
use vigil_approval::ActionKind;

use crate::artifact::Artifact;
use crate::schema::{ExecuteArgs, parse, require};
use crate::{BuiltinTool, ToolContext, ToolOutput, ToolResult};

/// Proposes a shell command for human approval.
pub struct ExecuteCommandTool;

#[async_trait::async_trait]
impl BuiltinTool for ExecuteCommandTool {
    fn name(&self) -> &'static str {
        "execute_command"
    }

    fn description(&self) -> &'static str {
        "Proposes a shell command to run in the workspace. The command does NOT run \
         immediately: a human must approve it first. Explain why it is needed in `reason`."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to run"
                },
                "reason": {
                    "type": "string",
                    "description": "Why this command should be run"
                },
                "cwd": {
                    "type": "string",
                    "description": "Working directory relative to the workspace root (default: root)"
                }
            },
            "required": ["command", "reason"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: ExecuteArgs = parse(args)?;
        require("command", &args.command)?;
        require("reason", &args.reason)?;

        // Fail now rather than after a human has approved an unusable cwd.
        let cwd = match args.cwd.as_deref() {
            Some(dir) => Some(
                ctx.inspector
                    .sandbox()
                    .resolve(dir, true)
                    .await?
                    .relative()
                    .to_string(),
            ),
            None => None,
        };

        let request_id = ctx
            .approvals
            .request(ActionKind::TerminalRun, args.reason.as_str(), args.command.as_str())?;
        info!(request_id = %request_id, command = %args.command, "Command awaiting approval");

        let content = json!({
            "status": "pending",
            "request_id": request_id,
            "message": "Command is waiting for human approval. It has not been run.",
        })
        .to_string();

        Ok(ToolOutput::with_artifact(content, Artifact::ApprovalRequired {
            request_id,
            command: args.command,
            reason: args.reason,
            cwd,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolError;
    use crate::test_support::context;

    #[tokio::test]
    async fn test_registers_pending_without_running() {
        let (dir, ctx) = context();
        let out = ExecuteCommandTool
            .execute(
                json!({ "command": "touch ran.txt", "reason": "test" }),
                &ctx,
            )
            .await
            .unwrap();

        let json: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json["request_id"].as_str().unwrap().starts_with("req_"));
        assert_eq!(ctx.approvals.pending_count(), 1);
        assert!(!dir.path().join("ran.txt").exists());

        let Some(Artifact::ApprovalRequired { command, cwd, .. }) = out.artifact else {
            panic!("expected approval artifact");
        };
        assert_eq!(command, "touch ran.txt");
        assert!(cwd.is_none());
    }

    #[tokio::test]
    async fn test_cwd_validated_up_front() {
        let (dir, ctx) = context();
        std::fs::create_dir(dir.path().join("web")).unwrap();

        let out = ExecuteCommandTool
            .execute(
                json!({ "command": "npm test", "reason": "r", "cwd": "web" }),
                &ctx,
            )
            .await
            .unwrap();
        assert!(matches!(
            out.artifact,
            Some(Artifact::ApprovalRequired { cwd: Some(ref c), .. }) if c == "web"
        ));

        let err = ExecuteCommandTool
            .execute(
                json!({ "command": "npm test", "reason": "r", "cwd": "../" }),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(err.is_violation());
        assert_eq!(ctx.approvals.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_reason_required() {
        let (_dir, ctx) = context();
        let err = ExecuteCommandTool
            .execute(json!({ "command": "ls", "reason": " " }), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert_eq!(ctx.approvals.pending_count(), 0);
    }
}
