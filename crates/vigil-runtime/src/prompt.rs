//! System prompt assembly.

use std::path::Path;

/// Build the system prompt for a workspace.
#[must_use]
pub fn build_system_prompt(workspace_root: &Path) -> String {
    let project_name = workspace_root.file_name().map_or_else(
        || "project".to_string(),
        |n| n.to_string_lossy().to_string(),
    );
    let os = std::env::consts::OS;

    let mut prompt = format!(
        "You are a careful engineering assistant working in the project \"{project_name}\".\n\n\
         # Environment\n\
         - Platform: {os}\n\
         - All paths are relative to the workspace root. Absolute paths and `..` are rejected.\n\n"
    );
    prompt.push_str(TOOL_GUIDELINES);
    prompt
}

const TOOL_GUIDELINES: &str = "\
# Tool Usage Guidelines

## Inspection
- Use `list_workspace_files` to explore before reading. Hidden folders and dependency caches are not listed.
- Use `read_file` to read a file. Long files are truncated; the result reports how much was omitted.
- Use `get_git_status` and `get_git_diff` to see what has changed.

## Commands
- `execute_command` does NOT run anything. It asks a human to approve the command.
- Always give a concrete `reason`. Propose one command at a time.
- After proposing a command, stop and tell the user what you proposed and why.

## General
- Read before concluding. Do not guess file contents.
- Keep answers focused on what the user asked.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_project_and_tools() {
        let prompt = build_system_prompt(Path::new("/work/my-app"));
        assert!(prompt.contains("\"my-app\""));
        assert!(prompt.contains("execute_command"));
        assert!(prompt.contains("does NOT run anything"));
    }

    #[test]
    fn test_prompt_root_without_name() {
        let prompt = build_system_prompt(Path::new("/"));
        assert!(prompt.contains("\"project\""));
    }
}
