//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use vigil_approval::ApprovalRegistry;
use vigil_workspace::{PathSandbox, WorkspaceInspector, WorkspaceRoot};

use crate::error::ToolResult;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec, ShellRunner};
use crate::truncate::READ_CHAR_LIMIT;
use crate::ToolContext;

/// Records specs and replays a fixed output.
pub(crate) struct FakeRunner {
    output: CommandOutput,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub(crate) fn new(output: CommandOutput) -> Arc<Self> {
        Arc::new(Self {
            output,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self.output.clone())
    }
}

pub(crate) fn sandbox(dir: &TempDir) -> PathSandbox {
    PathSandbox::new(WorkspaceRoot::new(dir.path()).unwrap())
}

pub(crate) fn context_with_runner(runner: Arc<dyn CommandRunner>) -> (TempDir, ToolContext) {
    let dir = TempDir::new().unwrap();
    let ctx = ToolContext {
        inspector: WorkspaceInspector::new(sandbox(&dir)),
        approvals: Arc::new(ApprovalRegistry::new()),
        runner,
        read_char_limit: READ_CHAR_LIMIT,
    };
    (dir, ctx)
}

pub(crate) fn context() -> (TempDir, ToolContext) {
    context_with_runner(Arc::new(ShellRunner::new()))
}
