//! Runner -> host request payloads for the `messages` and `tasks` mailboxes
//!
//! Field names match what the host-side consumer already parses, which is why
//! some keys are camelCase and others snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entry in `<ipc>/messages/`: deliver `text` to a chat right away
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "message")]
pub struct MessageRequest {
    #[serde(rename = "chatJid")]
    pub chat_jid: String,
    pub text: String,
    #[serde(rename = "groupFolder")]
    pub group_folder: String,
    /// RFC 3339 creation time
    pub timestamp: String,
}

/// Target of a pause, resume or cancel request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskControl {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "groupFolder")]
    pub group_folder: String,
    #[serde(rename = "isMain")]
    pub is_main: bool,
    pub timestamp: String,
}

/// Entry in `<ipc>/tasks/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskRequest {
    ScheduleTask {
        prompt: String,
        schedule_type: String,
        schedule_value: String,
        context_mode: String,
        #[serde(rename = "targetJid")]
        target_jid: String,
        #[serde(rename = "createdBy")]
        created_by: String,
        timestamp: String,
    },
    PauseTask(TaskControl),
    ResumeTask(TaskControl),
    CancelTask(TaskControl),
    RegisterGroup {
        jid: String,
        name: String,
        folder: String,
        trigger: String,
        timestamp: String,
    },
}

/// One task in the host-written `<ipc>/current_tasks.json` snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,

    #[serde(default)]
    pub prompt: String,

    pub schedule_type: String,

    pub schedule_value: String,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<String>,

    #[serde(rename = "groupFolder", default, skip_serializing_if = "Option::is_none")]
    pub group_folder: Option<String>,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}
