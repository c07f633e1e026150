//! `vigil ask`

use anyhow::Result;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use tracing::Instrument;
use vigil_approval::RequestId;
use vigil_runtime::{AgentRuntime, RuntimeError};
use vigil_telemetry::RequestContext;
use vigil_tools::Artifact;

use crate::theme::Theme;

/// How pending approvals are handled after the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApprovalMode {
    /// Ask on the terminal.
    Prompt,
    /// List them and exit.
    Skip,
}

pub(crate) async fn run_ask(runtime: &AgentRuntime, message: &str, json: bool, mode: ApprovalMode) -> Result<()> {
    let ctx = RequestContext::new("cli").with_operation("ask");
    let output = runtime.run_turn(message).instrument(ctx.span()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", output.text);
    println!(
        "{}",
        Theme::dimmed(&format!("[{} · {} tool round(s)]", output.provider, output.steps))
    );

    for artifact in output.approval_requests() {
        if let Artifact::ApprovalRequired {
            request_id,
            command,
            reason,
            cwd,
        } = artifact
        {
            println!();
            println!("{}", Theme::approval_box(command, reason, cwd.as_deref()));
            match mode {
                ApprovalMode::Prompt => {
                    approve_and_run(runtime, request_id, command, cwd.as_deref()).await;
                },
                ApprovalMode::Skip => {
                    println!("{}", Theme::dimmed(&format!("pending: {request_id}")));
                },
            }
        }
    }
    Ok(())
}

async fn approve_and_run(runtime: &AgentRuntime, request_id: &RequestId, command: &str, cwd: Option<&str>) {
    let approved = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Approve and run this command?")
        .default(false)
        .interact()
        .unwrap_or(false);
    if !approved {
        println!("{}", Theme::warning("Declined."));
        return;
    }

    let grant = match runtime.approvals().grant(request_id) {
        Ok(g) => g,
        Err(e) => {
            println!("{}", Theme::error(&e.to_string()));
            return;
        },
    };

    match runtime.execute_approved(command, &grant.token, cwd).await {
        Ok(out) => {
            println!("{}", Theme::success("Command succeeded"));
            print!("{out}");
        },
        Err(e) => {
            println!("{}", Theme::error(&e.to_string()));
            let partial = match &e {
                RuntimeError::Tool(tool) => tool.partial_output().unwrap_or_default(),
                _ => "",
            };
            print!("{partial}");
        },
    }
}
