//! Close handshake via a sentinel file in the input mailbox

use std::fs;
use std::path::{Path, PathBuf};

/// File name of the close sentinel inside the input mailbox
pub const CLOSE_SENTINEL: &str = "_close";

/// Out-of-band termination signal
///
/// The host creates `<input>/_close` (content irrelevant) when no further input
/// is coming. The runner consumes it exactly once.
#[derive(Debug, Clone)]
pub struct CloseSentinel {
    path: PathBuf,
}

impl CloseSentinel {
    /// Sentinel living in the given input mailbox directory
    pub fn new(input_dir: &Path) -> Self {
        Self {
            path: input_dir.join(CLOSE_SENTINEL),
        }
    }

    /// Full path of the sentinel file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` (and removes the sentinel) if a close was requested
    ///
    /// Removal is best-effort. If it fails the sentinel is simply seen again
    /// on the next check.
    pub fn check_and_consume(&self) -> bool {
        if !self.path.exists() {
            return false;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::debug!(
                path = %self.path.display(),
                error = %e,
                "failed to remove close sentinel"
            );
        }
        true
    }

    /// Remove a sentinel left behind by a previous runner
    ///
    /// Returns `true` if one was removed.
    pub fn clear_stale(&self) -> bool {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "removed stale close sentinel");
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_when_absent() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = CloseSentinel::new(temp_dir.path());
        assert!(!sentinel.check_and_consume());
    }

    #[test]
    fn test_closed_exactly_once() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = CloseSentinel::new(temp_dir.path());
        fs::write(sentinel.path(), b"").unwrap();

        assert!(sentinel.check_and_consume());
        assert!(!sentinel.path().exists());
        assert!(!sentinel.check_and_consume());
        assert!(!sentinel.check_and_consume());
    }

    #[test]
    fn test_content_is_irrelevant() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = CloseSentinel::new(temp_dir.path());
        fs::write(sentinel.path(), b"{\"type\":\"message\",\"text\":\"ignored\"}").unwrap();
        assert!(sentinel.check_and_consume());
    }

    #[test]
    fn test_clear_stale() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = CloseSentinel::new(temp_dir.path());
        assert!(!sentinel.clear_stale());

        fs::write(sentinel.path(), b"").unwrap();
        assert!(sentinel.clear_stale());
        assert!(!sentinel.path().exists());
    }
}
