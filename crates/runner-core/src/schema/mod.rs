//! Wire schemas shared with the host
//!
//! All types serialize to the exact JSON the host reads and writes; unknown
//! fields on inbound documents are preserved where the host may add more.

pub mod container_input;
pub mod frame;
pub mod input_message;
pub mod ipc_request;

pub use container_input::ContainerInput;
pub use frame::{FrameStatus, OutputFrame};
pub use input_message::InputMessage;
pub use ipc_request::{MessageRequest, TaskControl, TaskRequest, TaskSnapshot};
