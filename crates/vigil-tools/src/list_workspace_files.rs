//! List workspace files tool.

use serde_json::{Value, json};

use crate::artifact::Artifact;
use crate::schema::{ListArgs, parse};
use crate::{BuiltinTool, ToolContext, ToolOutput, ToolResult};

/// Returns the directory tree under a workspace path.
pub struct ListWorkspaceFilesTool;

#[async_trait::async_trait]
impl BuiltinTool for ListWorkspaceFilesTool {
    fn name(&self) -> &'static str {
        "list_workspace_files"
    }

    fn description(&self) -> &'static str {
        "Lists files and directories in the workspace as a tree. Paths are relative \
         to the workspace root. Hidden entries and dependency folders are skipped."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory relative to the workspace root (default: root)"
                },
                "depth": {
                    "type": "integer",
                    "description": "How many levels to descend (default: 2)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: ListArgs = parse(args)?;
        let tree = ctx.inspector.list(args.path.as_deref(), args.depth).await?;

        let path = args
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(".")
            .to_string();
        let content = json!({ "path": path, "tree": tree }).to_string();
        Ok(ToolOutput::with_artifact(content, Artifact::FileTree { path, tree }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;

    #[tokio::test]
    async fn test_lists_root() {
        let (dir, ctx) = context();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "").unwrap();

        let out = ListWorkspaceFilesTool.execute(Value::Null, &ctx).await.unwrap();
        let json: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(json["path"], ".");
        assert_eq!(json["tree"][0]["name"], "src");
        assert_eq!(json["tree"][0]["children"][0]["path"], "src/main.rs");
        assert!(matches!(out.artifact, Some(Artifact::FileTree { .. })));
    }

    #[tokio::test]
    async fn test_escape_rejected() {
        let (_dir, ctx) = context();
        let err = ListWorkspaceFilesTool
            .execute(json!({ "path": "../.." }), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_violation());
    }
}
