//! Core protocol for nanoclaw agent runners
//!
//! A runner process talks to its supervising host only through a shared IPC
//! directory tree and its own stdout:
//!
//! ```text
//! <ipc>/input/*.json      host -> runner follow-up messages
//! <ipc>/input/_close      host -> runner termination sentinel
//! <ipc>/messages/*.json   runner -> host message-send requests
//! <ipc>/tasks/*.json      runner -> host task and group requests
//! stdout                  runner -> host framed result objects
//! ```
//!
//! This crate holds the synchronous, filesystem-level pieces of that protocol.
//! The async control loop lives in the `agent-runner` crate.

pub mod io;
pub mod logging;
pub mod output;
pub mod paths;
pub mod schema;

pub use io::{CloseSentinel, Inbox, MailboxError};
pub use output::{FrameReader, OutputChannel};
pub use paths::IpcPaths;
pub use schema::{ContainerInput, FrameStatus, InputMessage, OutputFrame};
