//! Stdin handoff and initial prompt assembly.

use runner_core::{ContainerInput, Inbox};
use std::io::Read;
use thiserror::Error;

/// Marker prepended to prompts that came from the host scheduler
pub const SCHEDULED_TASK_PREFIX: &str = "[SCHEDULED TASK - The following message was sent automatically and is not coming directly from the user or group.]\n\n";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to read input: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse input: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read the handoff document from `reader` to EOF and decode it.
///
/// # Errors
///
/// Returns [`StartupError`] if reading fails or the document is not a valid
/// handoff.
pub fn read_handoff<R: Read>(mut reader: R) -> Result<ContainerInput, StartupError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    Ok(ContainerInput::from_json(&raw)?)
}

/// Initial prompt: the handoff prompt plus anything already queued.
///
/// Scheduled prompts get [`SCHEDULED_TASK_PREFIX`]. Messages drained from the
/// inbox are appended on their own lines, in mailbox order.
pub fn initial_prompt(input: &ContainerInput, inbox: &Inbox) -> String {
    let mut prompt = if input.is_scheduled_task {
        format!("{SCHEDULED_TASK_PREFIX}{}", input.prompt)
    } else {
        input.prompt.clone()
    };

    let pending = inbox.drain();
    if !pending.is_empty() {
        tracing::info!(count = pending.len(), "draining pending IPC messages into initial prompt");
        prompt.push('\n');
        prompt.push_str(&pending.join("\n"));
    }
    prompt
}
