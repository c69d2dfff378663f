//! System prompt assembly.

use crate::context::RunnerContext;
use runner_core::paths::WorkspacePaths;
use std::fs;
use std::path::Path;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Build the system prompt from instruction files plus a generated context block
///
/// Sections, in order: the group's `CLAUDE.md`, the global `CLAUDE.md` (non-main
/// groups only), then the runner context and tool list. Missing files are
/// skipped.
pub fn build_system_prompt(ctx: &RunnerContext, workspace: &WorkspacePaths) -> String {
    let mut parts = Vec::new();

    if let Some(group) = read_instructions(&workspace.group_instructions()) {
        parts.push(group);
    }
    if !ctx.is_main {
        if let Some(global) = read_instructions(&workspace.global_instructions()) {
            parts.push(global);
        }
    }

    let mut context_lines = vec![
        "# NanoClaw Agent Context".to_string(),
        format!("- Chat JID: {}", ctx.chat_jid),
        format!("- Group Folder: {}", ctx.group_folder),
        format!("- Role: {}", ctx.role_label()),
        String::new(),
        "## Available IPC Tools".to_string(),
        "- `send_message`: Send a message to the user/group immediately".to_string(),
        "- `schedule_task`: Schedule a recurring or one-time task".to_string(),
        "- `list_tasks`: List all scheduled tasks".to_string(),
        "- `pause_task`: Pause a scheduled task".to_string(),
        "- `resume_task`: Resume a paused task".to_string(),
        "- `cancel_task`: Cancel and delete a scheduled task".to_string(),
    ];
    if ctx.is_main {
        context_lines.push("- `register_group`: Register a new group (main only)".to_string());
    }
    parts.push(context_lines.join("\n"));

    parts.join(SECTION_SEPARATOR)
}

fn read_instructions(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read instructions");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx(is_main: bool) -> RunnerContext {
        RunnerContext {
            chat_jid: "j@g.us".to_string(),
            group_folder: "fam".to_string(),
            is_main,
            session_id: "s".to_string(),
            is_scheduled_task: false,
        }
    }

    fn workspace_with_files() -> (TempDir, WorkspacePaths) {
        let temp_dir = TempDir::new().unwrap();
        let ws = WorkspacePaths::new(temp_dir.path());
        fs::create_dir_all(ws.group_dir()).unwrap();
        fs::create_dir_all(ws.global_dir()).unwrap();
        fs::write(ws.group_instructions(), "\n# Group rules\n").unwrap();
        fs::write(ws.global_instructions(), "# Global rules\n").unwrap();
        (temp_dir, ws)
    }

    #[test]
    fn test_group_prompt_includes_global_instructions() {
        let (_tmp, ws) = workspace_with_files();
        let prompt = build_system_prompt(&ctx(false), &ws);

        let sections: Vec<&str> = prompt.split(SECTION_SEPARATOR).collect();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0], "# Group rules");
        assert_eq!(sections[1], "# Global rules");
        assert!(sections[2].contains("- Role: Group agent"));
        assert!(!sections[2].contains("register_group"));
    }

    #[test]
    fn test_main_prompt_skips_global_instructions() {
        let (_tmp, ws) = workspace_with_files();
        let prompt = build_system_prompt(&ctx(true), &ws);

        assert!(!prompt.contains("# Global rules"));
        assert!(prompt.contains("- Role: Main (admin)"));
        assert!(prompt.contains("register_group"));
    }

    #[test]
    fn test_missing_files_leave_context_only() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = build_system_prompt(&ctx(false), &WorkspacePaths::new(temp_dir.path()));
        assert!(prompt.starts_with("# NanoClaw Agent Context"));
        assert!(prompt.contains("- Chat JID: j@g.us"));
    }
}
