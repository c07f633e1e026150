//! Agent runtime - the bounded model/tool loop.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use vigil_approval::{ApprovalRegistry, ApprovalToken};
use vigil_llm::{FallbackChat, ProviderConfig, ProviderFactory};
use vigil_tools::{
    Artifact, CommandExecutor, CommandRunner, EXECUTE_COMMAND, ToolContext, ToolRegistry,
};
use vigil_workspace::{PathSandbox, WorkspaceInspector, WorkspaceRoot};

use crate::config::RuntimeConfig;
use crate::error::RuntimeResult;
use crate::prompt::build_system_prompt;

/// Returned when a turn produced no text at all.
pub const FALLBACK_RESPONSE: &str = "I wasn't able to produce a response. Please try rephrasing your request.";

/// Why a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model answered without requesting tools.
    Completed,
    /// The response text outgrew the character budget.
    CharBudget,
    /// The maximum number of tool rounds was used.
    StepLimit,
    /// A command was proposed and now waits for a human.
    AwaitingApproval,
    /// The serving provider failed after tools had run.
    ProviderFailed,
}

/// Result of one user message.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutput {
    /// Response text, stop notices first.
    pub text: String,
    /// Artifacts produced by tools, in dispatch order.
    pub artifacts: Vec<Artifact>,
    /// Label of the provider that served the conversation.
    pub provider: String,
    /// Tool rounds dispatched.
    pub steps: usize,
    /// Why the loop ended.
    pub stop: StopReason,
}

impl TurnOutput {
    /// Approval artifacts raised during the turn.
    pub fn approval_requests(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .iter()
            .filter(|a| matches!(a, Artifact::ApprovalRequired { .. }))
    }
}

/// The main agent runtime.
pub struct AgentRuntime {
    /// Provider chain; each turn starts a fresh conversation.
    chat: FallbackChat,
    /// Built-in tools.
    tools: ToolRegistry,
    /// State shared by the tools.
    tool_ctx: ToolContext,
    /// Runs commands once approved.
    executor: CommandExecutor,
    /// Limits.
    config: RuntimeConfig,
}

impl std::fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("providers", &self.chat.configs().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AgentRuntime {
    /// Create a runtime over `root`, trying `providers` in order.
    #[must_use]
    pub fn new(
        providers: Vec<ProviderConfig>,
        root: WorkspaceRoot,
        approvals: Arc<ApprovalRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        let system = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| build_system_prompt(root.as_path()));
        let sandbox = PathSandbox::new(root);
        let tools = ToolRegistry::with_defaults();
        let chat = FallbackChat::new(providers)
            .with_system(system)
            .with_tools(tools.all_definitions());
        let tool_ctx = ToolContext::new(WorkspaceInspector::new(sandbox.clone()), Arc::clone(&approvals))
            .with_read_char_limit(config.read_char_limit);
        let executor = CommandExecutor::new(approvals, sandbox);

        Self {
            chat,
            tools,
            tool_ctx,
            executor,
            config,
        }
    }

    /// Build providers with `factory` instead of the HTTP adapters.
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.chat = self.chat.with_factory(factory);
        self
    }

    /// Run git tools and approved commands with `runner`.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.tool_ctx = self.tool_ctx.with_runner(Arc::clone(&runner));
        self.executor = self.executor.with_runner(runner);
        self
    }

    /// The approval registry shared with the tools.
    #[must_use]
    pub fn approvals(&self) -> &Arc<ApprovalRegistry> {
        &self.tool_ctx.approvals
    }

    /// Configured providers, in priority order.
    #[must_use]
    pub fn providers(&self) -> &[ProviderConfig] {
        self.chat.configs()
    }

    /// Limits in effect.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Answer one user message, calling tools as the model requests.
    ///
    /// Tool failures are reported to the model and never end the turn. If
    /// the serving provider fails after tools have run, the turn ends with
    /// [`StopReason::ProviderFailed`] and keeps the text and artifacts
    /// gathered so far.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::Configuration`](crate::RuntimeError::Configuration)
    ///   when no provider is configured
    /// - [`RuntimeError::Provider`](crate::RuntimeError::Provider) when every
    ///   provider fails on the first message
    pub async fn run_turn(&self, user_message: &str) -> RuntimeResult<TurnOutput> {
        let (mut session, mut turn) = self.chat.start(user_message).await?;
        let provider = session.label().to_string();
        info!(provider = %provider, "Conversation started");

        let mut text = String::new();
        let mut artifacts = Vec::new();
        let mut notices: Vec<String> = Vec::new();
        let mut steps: usize = 0;

        let stop = loop {
            append_text(&mut text, &turn.text);

            if !turn.has_tool_calls() {
                break StopReason::Completed;
            }
            if text.chars().count() > self.config.char_budget {
                notices.push(format!(
                    "[Note: response truncated at the {} character limit; remaining tool calls were skipped.]",
                    self.config.char_budget
                ));
                break StopReason::CharBudget;
            }
            if steps >= self.config.max_steps {
                notices.push(format!(
                    "[Note: stopped after {} tool steps. Ask me to continue if more work is needed.]",
                    self.config.max_steps
                ));
                break StopReason::StepLimit;
            }

            steps = steps.saturating_add(1);
            debug!(step = steps, calls = turn.tool_calls.len(), "Dispatching tool calls");

            let mut results = Vec::with_capacity(turn.tool_calls.len());
            let mut proposed_command = false;
            for call in &turn.tool_calls {
                let dispatched = self.tools.dispatch(call, &self.tool_ctx).await;
                proposed_command |= call.name == EXECUTE_COMMAND;
                results.push(dispatched.result);
                artifacts.extend(dispatched.artifact);
            }

            turn = match session.send_tool_results(results).await {
                Ok(next) => next,
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Provider failed mid-turn");
                    notices.push(format!("[Note: the model provider failed mid-turn: {e}]"));
                    break StopReason::ProviderFailed;
                },
            };

            if proposed_command {
                append_text(&mut text, &turn.text);
                if turn.has_tool_calls() {
                    warn!(
                        ignored = turn.tool_calls.len(),
                        "Ignoring tool calls requested after a command proposal"
                    );
                    notices.push(
                        "[Note: further actions were skipped because a command is awaiting your approval.]"
                            .to_string(),
                    );
                }
                break StopReason::AwaitingApproval;
            }
        };

        info!(provider = %provider, steps, stop = ?stop, artifacts = artifacts.len(), "Turn finished");
        Ok(TurnOutput {
            text: compose(&notices, &text, self.config.char_budget),
            artifacts,
            provider,
            steps,
            stop,
        })
    }

    /// Run a command a human has approved.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Tool`](crate::RuntimeError::Tool) wrapping the
    /// executor's error (permission denied, path violation, or failure).
    pub async fn execute_approved(
        &self,
        command: &str,
        token: &ApprovalToken,
        cwd: Option<&str>,
    ) -> RuntimeResult<String> {
        Ok(self.executor.execute(command, token, cwd).await?)
    }
}

fn append_text(buf: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push_str("\n\n");
    }
    buf.push_str(text);
}

fn compose(notices: &[String], text: &str, budget: usize) -> String {
    let body: String = text.chars().take(budget).collect();
    let mut parts: Vec<&str> = notices.iter().map(String::as_str).collect();
    if !body.is_empty() {
        parts.push(&body);
    }
    if parts.is_empty() {
        return FALLBACK_RESPONSE.to_string();
    }
    parts.join("\n\n")
}
