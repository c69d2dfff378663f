//! Result frames written to the host over stdout

use serde::{Deserialize, Serialize};

/// Frame status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStatus {
    Success,
    Error,
}

/// One structured unit on the output stream
///
/// A `Success` frame with `result: None` marks the end of a turn, not the end
/// of the process. An `Error` frame is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFrame {
    pub status: FrameStatus,

    /// Always serialized, `null` when absent
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutputFrame {
    /// Success frame carrying `result` (or the end-of-turn marker when `None`)
    pub fn success(result: Option<String>, session_id: Option<&str>) -> Self {
        Self {
            status: FrameStatus::Success,
            result,
            new_session_id: non_empty(session_id),
            error: None,
        }
    }

    /// Terminal error frame
    pub fn error(message: impl Into<String>, session_id: Option<&str>) -> Self {
        let message = message.into();
        Self {
            status: FrameStatus::Error,
            result: None,
            new_session_id: non_empty(session_id),
            error: if message.is_empty() { None } else { Some(message) },
        }
    }

    /// `true` for the null-result success frame closing a turn
    pub fn is_end_of_turn(&self) -> bool {
        self.status == FrameStatus::Success && self.result.is_none()
    }

    /// `true` for frames after which the runner exits
    pub fn is_terminal(&self) -> bool {
        self.status == FrameStatus::Error || self.error.is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
