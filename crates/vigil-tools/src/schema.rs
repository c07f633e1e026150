//! Typed tool arguments.
//!
//! Models send arguments as loosely-typed JSON. Each tool parses them into
//! one of these structs first, so a malformed call fails before any side
//! effect.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ToolError, ToolResult};

/// Arguments of `list_workspace_files`.
#[derive(Debug, Default, Deserialize)]
pub struct ListArgs {
    /// Root-relative directory; the root when absent.
    #[serde(default)]
    pub path: Option<String>,
    /// Levels to descend.
    #[serde(default)]
    pub depth: Option<usize>,
}

/// Arguments of `read_file`.
#[derive(Debug, Deserialize)]
pub struct ReadArgs {
    /// Root-relative file path.
    pub path: String,
}

/// Arguments of `execute_command`.
#[derive(Debug, Deserialize)]
pub struct ExecuteArgs {
    /// Shell command to propose.
    pub command: String,
    /// Why the model wants to run it.
    pub reason: String,
    /// Root-relative working directory.
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Arguments of the git tools.
#[derive(Debug, Default, Deserialize)]
pub struct GitArgs {
    /// Root-relative directory to run git in.
    #[serde(default)]
    pub cwd: Option<String>,
    /// Show the staged diff (`get_git_diff` only).
    #[serde(default)]
    pub staged: bool,
}

/// Deserialize tool arguments. `null` is treated as an empty object; a
/// string is the undecodable text an adapter passed through.
pub(crate) fn parse<T: DeserializeOwned>(args: Value) -> ToolResult<T> {
    let args = match args {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::String(raw) => {
            return Err(ToolError::InvalidArguments(format!(
                "arguments are not valid JSON: {raw}"
            )));
        },
        other => other,
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Reject empty or whitespace-only required strings.
pub(crate) fn require(field: &str, value: &str) -> ToolResult<()> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArguments(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_args_default() {
        let args: ListArgs = parse(Value::Null).unwrap();
        assert!(args.path.is_none());
        assert!(args.depth.is_none());
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse::<ExecuteArgs>(json!({ "command": "ls" })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(msg) if msg.contains("reason")));
    }

    #[test]
    fn test_wrong_type() {
        assert!(parse::<ListArgs>(json!({ "depth": "deep" })).is_err());
    }

    #[test]
    fn test_undecodable_string_args() {
        let err = parse::<ListArgs>(Value::String("{\"path\": \"x".to_string())).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(msg) if msg.contains("not valid JSON")));
    }

    #[test]
    fn test_require() {
        assert!(require("path", "  ").is_err());
        assert!(require("path", "a").is_ok());
    }
}
