//! Follow-up message schema for the input mailbox

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entry in `<ipc>/input/`
///
/// Only `type` and `text` matter to the runner; any other fields the host adds
/// are preserved but ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputMessage {
    /// Entry kind; only `"message"` is consumed
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Message body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl InputMessage {
    /// Plain follow-up message
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: Some("message".to_string()),
            text: Some(text.into()),
            unknown_fields: HashMap::new(),
        }
    }

    /// Text to feed to the agent, if this is a non-empty message entry
    pub fn message_text(&self) -> Option<&str> {
        if self.kind.as_deref() != Some("message") {
            return None;
        }
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}
