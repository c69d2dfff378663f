//! IPC and workspace directory layout
//!
//! Inside the runner container the host mounts:
//!
//! ```text
//! /workspace/ipc/       shared mailboxes (see [`IpcPaths`])
//! /workspace/group/     the group's working directory
//! /workspace/global/    files shared by every non-main group
//! ```
//!
//! Both roots are configurable; see the runner's config resolution.

use crate::io::{CloseSentinel, Inbox};
use std::path::{Path, PathBuf};

pub const DEFAULT_IPC_DIR: &str = "/workspace/ipc";
pub const DEFAULT_WORKSPACE_DIR: &str = "/workspace";

/// Mailbox directories under one IPC root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcPaths {
    root: PathBuf,
}

impl IpcPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host -> runner follow-up messages
    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    /// Runner -> host message-send requests
    pub fn messages_dir(&self) -> PathBuf {
        self.root.join("messages")
    }

    /// Runner -> host task and group requests
    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    /// Host-written snapshot of scheduled tasks
    pub fn current_tasks_file(&self) -> PathBuf {
        self.root.join("current_tasks.json")
    }

    pub fn inbox(&self) -> Inbox {
        Inbox::new(&self.input_dir())
    }

    pub fn close_sentinel(&self) -> CloseSentinel {
        CloseSentinel::new(&self.input_dir())
    }
}

/// Group and global directories under one workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn group_dir(&self) -> PathBuf {
        self.root.join("group")
    }

    pub fn global_dir(&self) -> PathBuf {
        self.root.join("global")
    }

    pub fn group_instructions(&self) -> PathBuf {
        self.group_dir().join("CLAUDE.md")
    }

    pub fn global_instructions(&self) -> PathBuf {
        self.global_dir().join("CLAUDE.md")
    }
}
