//! Error types for mailbox I/O

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing or claiming mailbox entries
#[derive(Error, Debug)]
pub enum MailboxError {
    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize or parse JSON
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The final entry name was already taken by another producer
    #[error("Mailbox entry already exists: {path}")]
    Collision { path: PathBuf },

    /// Path has no usable file name component
    #[error("Invalid mailbox path: {path}")]
    InvalidPath { path: PathBuf },
}
