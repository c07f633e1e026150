//! Workspace and registry fixtures.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use vigil_approval::{ApprovalRegistry, ManualClock};
use vigil_workspace::{PathSandbox, WorkspaceInspector, WorkspaceRoot};

use crate::ids::SequenceIds;

/// A temporary workspace directory that is removed on drop.
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp workspace"),
        }
    }

    /// The workspace directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, contents).expect("write fixture file");
        self
    }

    /// Create the directory `relative` (and its parents).
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_dir(self, relative: &str) -> Self {
        std::fs::create_dir_all(self.dir.path().join(relative)).expect("create fixture dir");
        self
    }

    /// The canonical workspace root.
    ///
    /// # Panics
    ///
    /// Panics if the directory vanished.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn root(&self) -> WorkspaceRoot {
        WorkspaceRoot::new(self.dir.path()).expect("workspace root")
    }

    /// A sandbox over this workspace.
    #[must_use]
    pub fn sandbox(&self) -> PathSandbox {
        PathSandbox::new(self.root())
    }

    /// An inspector over this workspace.
    #[must_use]
    pub fn inspector(&self) -> WorkspaceInspector {
        WorkspaceInspector::new(self.sandbox())
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry driven by a manual clock and scripted ids.
///
/// Returns the registry and the clock so tests can advance time.
#[must_use]
pub fn test_approvals(ids: SequenceIds) -> (Arc<ApprovalRegistry>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let registry = ApprovalRegistry::new()
        .with_clock(Arc::clone(&clock) as _)
        .with_ids(Arc::new(ids));
    (Arc::new(registry), clock)
}

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
