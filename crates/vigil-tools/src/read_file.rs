//! Read file tool.

use serde_json::{Value, json};

use crate::artifact::Artifact;
use crate::schema::{ReadArgs, parse, require};
use crate::truncate::truncate_chars;
use crate::{BuiltinTool, ToolContext, ToolOutput, ToolResult};

/// Returns the text of a workspace file, cut to the read limit.
pub struct ReadFileTool;

#[async_trait::async_trait]
impl BuiltinTool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Reads a text file from the workspace. The path is relative to the workspace \
         root. Long files are truncated; the result says how many characters were omitted."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to the workspace root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: ReadArgs = parse(args)?;
        require("path", &args.path)?;

        let text = ctx.inspector.read(&args.path).await?;
        let shown = truncate_chars(&text, ctx.read_char_limit);
        let path = args.path.trim().to_string();

        let content = json!({
            "path": path,
            "content": shown.content,
            "truncated": shown.truncated,
            "totalChars": shown.total_chars,
            "omittedChars": shown.omitted_chars,
        })
        .to_string();

        Ok(ToolOutput::with_artifact(content, Artifact::FileContent {
            path,
            content: shown.content,
            truncated: shown.truncated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolError;
    use crate::test_support::context;

    #[tokio::test]
    async fn test_reads_small_file() {
        let (dir, ctx) = context();
        std::fs::write(dir.path().join("README.md"), "# Title").unwrap();

        let out = ReadFileTool
            .execute(json!({ "path": "README.md" }), &ctx)
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(json["content"], "# Title");
        assert_eq!(json["truncated"], false);
        assert_eq!(json["omittedChars"], 0);
    }

    #[tokio::test]
    async fn test_truncates_long_file() {
        let (dir, ctx) = context();
        std::fs::write(dir.path().join("big.txt"), "a".repeat(25_000)).unwrap();

        let out = ReadFileTool
            .execute(json!({ "path": "big.txt" }), &ctx)
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(json["truncated"], true);
        assert_eq!(json["totalChars"], 25_000);
        assert_eq!(json["omittedChars"], 5_000);
        assert_eq!(json["content"].as_str().unwrap().len(), 20_000);
        assert!(matches!(
            out.artifact,
            Some(Artifact::FileContent { truncated: true, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_path_argument() {
        let (_dir, ctx) = context();
        let err = ReadFileTool.execute(json!({}), &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        let err = ReadFileTool
            .execute(json!({ "path": "" }), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_absolute_path_rejected() {
        let (_dir, ctx) = context();
        let err = ReadFileTool
            .execute(json!({ "path": "/etc/passwd" }), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_violation());
    }
}
