//! One-shot task handoff read from stdin

use serde::{Deserialize, Serialize};

/// Task description delivered once on stdin before the loop starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInput {
    /// Initial prompt for the agent
    pub prompt: String,

    /// Folder name of the group this runner serves
    pub group_folder: String,

    /// Chat identifier outbound messages are addressed to
    pub chat_jid: String,

    /// Whether this is the privileged main group
    pub is_main: bool,

    /// Existing session to resume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Prompt was produced by the host scheduler rather than a user
    #[serde(default)]
    pub is_scheduled_task: bool,
}

impl ContainerInput {
    /// Decode the handoff document
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error for malformed input or missing
    /// required fields.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
