//! Wait-for-next-message: the only blocking point of the runner.
//!
//! Each cycle checks the close sentinel first, then drains the inbox, then
//! sleeps for the poll interval. A close signal or a new message is therefore
//! observed within one interval of appearing.

use runner_core::{CloseSentinel, Inbox};
use std::time::Duration;

/// Fixed delay between polling cycles
pub const IPC_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// What ended a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// One or more messages arrived, joined with newlines
    Message(String),
    /// The close sentinel was observed and consumed
    Closed,
}

/// Poll `inbox` and `close` until one of them yields.
pub async fn wait_for_message(
    inbox: &Inbox,
    close: &CloseSentinel,
    interval: Duration,
) -> WaitOutcome {
    loop {
        if close.check_and_consume() {
            tracing::debug!("close sentinel observed while waiting");
            return WaitOutcome::Closed;
        }
        if let Some(text) = inbox.drain_joined() {
            return WaitOutcome::Message(text);
        }
        tokio::time::sleep(interval).await;
    }
}
