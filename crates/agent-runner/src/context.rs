//! Per-process runner identity.
//!
//! [`RunnerContext`] is built once from the stdin handoff and passed by
//! reference to every component that needs to know which chat, group or
//! session it is acting for.

use runner_core::ContainerInput;

/// Who this runner is working for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerContext {
    /// Chat identifier outbound messages default to
    pub chat_jid: String,
    /// Group folder name, used as the `createdBy`/`groupFolder` of requests
    pub group_folder: String,
    /// Privileged main group (may target other chats, register groups)
    pub is_main: bool,
    /// Session correlating every agent call and frame of this process
    pub session_id: String,
    /// Initial prompt came from the host scheduler
    pub is_scheduled_task: bool,
}

impl RunnerContext {
    /// Build the context, reusing the handoff session or minting a new one.
    pub fn from_input(input: &ContainerInput) -> Self {
        let session_id = input
            .session_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            chat_jid: input.chat_jid.clone(),
            group_folder: input.group_folder.clone(),
            is_main: input.is_main,
            session_id,
            is_scheduled_task: input.is_scheduled_task,
        }
    }

    /// Human-readable role for prompts and logs
    pub fn role_label(&self) -> &'static str {
        if self.is_main { "Main (admin)" } else { "Group agent" }
    }
}
