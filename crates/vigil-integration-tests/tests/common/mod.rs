//! Shared harness for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use vigil_approval::ApprovalRegistry;
use vigil_llm::{ProviderConfig, ProviderFamily};
use vigil_runtime::{AgentRuntime, RuntimeConfig};
use vigil_test::{
    ManualClock, MockLlmProvider, MockProviderFactory, MockTurn, SequenceIds, TestWorkspace,
    test_approvals,
};
use vigil_tools::{CommandOutput, CommandRunner, CommandSpec, ToolResult};

/// Label of the single mock provider the harness configures.
pub const MOCK_LABEL: &str = "anthropic:mock";

/// A runtime over a temp workspace, one scripted provider, a manual clock
/// and a runner that never spawns processes.
pub struct RuntimeTestHarness {
    pub runtime: AgentRuntime,
    pub mock: MockLlmProvider,
    pub approvals: Arc<ApprovalRegistry>,
    pub clock: Arc<ManualClock>,
    pub runner: Arc<RecordingRunner>,
    pub workspace: TestWorkspace,
}

impl RuntimeTestHarness {
    pub fn new(workspace: TestWorkspace, turns: Vec<MockTurn>) -> Self {
        Self::with_config(workspace, turns, RuntimeConfig::default())
    }

    pub fn with_config(workspace: TestWorkspace, turns: Vec<MockTurn>, config: RuntimeConfig) -> Self {
        let mock = MockLlmProvider::new(turns);
        let (approvals, clock) = test_approvals(
            SequenceIds::new()
                .with_request_ids(["req_ab12"])
                .with_tokens(["tok_first"]),
        );
        let runner = Arc::new(RecordingRunner::succeeding("ok\n"));
        let factory = MockProviderFactory::new().with_provider(MOCK_LABEL, mock.clone());
        let runtime = AgentRuntime::new(
            vec![ProviderConfig::new(ProviderFamily::Anthropic, "test-key", "mock")],
            workspace.root(),
            Arc::clone(&approvals),
            config,
        )
        .with_factory(Arc::new(factory))
        .with_runner(Arc::clone(&runner) as Arc<dyn CommandRunner>);

        Self {
            runtime,
            mock,
            approvals,
            clock,
            runner,
            workspace,
        }
    }
}

/// Records every spec and replays a fixed output.
pub struct RecordingRunner {
    output: CommandOutput,
    calls: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn succeeding(stdout: &str) -> Self {
        Self {
            output: CommandOutput {
                stdout: stdout.to_string(),
                exit_code: Some(0),
                ..Default::default()
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self.output.clone())
    }
}
