//! Draining the input mailbox

use crate::io::close::CloseSentinel;
use crate::schema::InputMessage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Single consumer of the host -> runner input mailbox
#[derive(Debug, Clone)]
pub struct Inbox {
    dir: PathBuf,
}

impl Inbox {
    /// Inbox over the given input mailbox directory
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Mailbox directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Close sentinel living in this inbox
    pub fn close_sentinel(&self) -> CloseSentinel {
        CloseSentinel::new(&self.dir)
    }

    /// Claim and delete every queued entry, returning message texts in order
    ///
    /// Entries are processed in file name order. Each one is read before it is
    /// removed. Only `{"type": "message", "text": <non-empty>}` entries
    /// contribute text; everything else is deleted and dropped. Entries that
    /// vanish between listing and reading are skipped. Never fails: directory
    /// errors are logged and yield an empty batch.
    pub fn drain(&self) -> Vec<String> {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(path = %self.dir.display(), error = %e, "inbox drain error");
            return Vec::new();
        }

        let entries = match self.pending_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.dir.display(), error = %e, "inbox drain error");
                return Vec::new();
            }
        };

        let mut texts = Vec::new();
        for path in entries {
            if let Some(text) = claim_entry(&path) {
                texts.push(text);
            }
        }
        texts
    }

    /// Drain and join the batch with newlines, `None` if nothing was queued
    pub fn drain_joined(&self) -> Option<String> {
        let texts = self.drain();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }

    /// Sorted `*.json` regular files currently visible in the mailbox
    fn pending_entries(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        entries.sort();
        Ok(entries)
    }
}

/// Read, delete, and decode one entry
fn claim_entry(path: &Path) -> Option<String> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read input entry");
            remove_entry(path);
            return None;
        }
    };

    remove_entry(path);

    match serde_json::from_slice::<InputMessage>(&content) {
        Ok(message) => message.message_text().map(str::to_string),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding malformed input entry");
            None
        }
    }
}

fn remove_entry(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove input entry");
        }
    }
}
