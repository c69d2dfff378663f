//! Filesystem mailboxes shared between a runner and its host
//!
//! A mailbox is a plain directory used as an ordered, multi-producer /
//! single-consumer queue. Key properties:
//!
//! - **Atomic publish**: entries are written to a colocated `.tmp` file and
//!   linked into place, so readers never see a partial `.json` entry and an
//!   existing entry is never replaced
//! - **Filename ordering**: entries are named `{epoch-millis}-{suffix}.json`;
//!   lexicographic order equals creation order
//! - **Claim-then-delete**: the consumer reads an entry before removing it, so a
//!   crash mid-drain leaves the entry for the next drain (at-least-once)
//! - **Sentinel files**: `_close` in the input mailbox signals termination by
//!   its existence alone
//!
//! # Example
//!
//! ```rust,no_run
//! use runner_core::io::{publish, Inbox};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let input = Path::new("/workspace/ipc/input");
//! let name = publish(input, &json!({"type": "message", "text": "follow up"})).unwrap();
//! println!("queued {name}");
//!
//! let inbox = Inbox::new(input);
//! for text in inbox.drain() {
//!     println!("claimed: {text}");
//! }
//! ```

pub mod close;
pub mod error;
pub mod inbox;
pub mod mailbox;

// Re-export primary API
pub use close::{CLOSE_SENTINEL, CloseSentinel};
pub use error::MailboxError;
pub use inbox::Inbox;
pub use mailbox::{entry_name, publish, publish_as};
