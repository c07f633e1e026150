//! Structured, UI-facing records produced while tools run.

use serde::{Deserialize, Serialize};
use vigil_approval::RequestId;
use vigil_workspace::FileNode;

/// Which git view produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitView {
    /// `git status`.
    Status,
    /// `git diff`.
    Diff,
}

/// Something a frontend can render alongside the model's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Artifact {
    /// A directory listing.
    FileTree {
        /// Root-relative directory listed.
        path: String,
        /// The listing.
        tree: Vec<FileNode>,
    },
    /// File content as shown to the model.
    FileContent {
        /// Root-relative file path.
        path: String,
        /// Content (possibly truncated).
        content: String,
        /// Whether content was cut.
        truncated: bool,
    },
    /// A command waiting for human approval.
    ApprovalRequired {
        /// Id to grant.
        request_id: RequestId,
        /// Proposed command.
        command: String,
        /// Model-supplied justification.
        reason: String,
        /// Root-relative working directory to run in.
        #[serde(skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
    /// Output of a read-only git command.
    GitOutput {
        /// Which view.
        view: GitView,
        /// Raw output.
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_artifact_shape() {
        let artifact = Artifact::ApprovalRequired {
            request_id: RequestId::from("req_1"),
            command: "npm test".to_string(),
            reason: "run tests".to_string(),
            cwd: None,
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["type"], "approval_required");
        assert_eq!(json["request_id"], "req_1");
        assert!(json.get("cwd").is_none());
    }
}
