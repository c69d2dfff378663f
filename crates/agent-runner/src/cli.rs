//! CLI argument types for agent-runner.
//!
//! The runner takes no subcommands: the task arrives on stdin and everything
//! else comes from flags, `NANOCLAW_*` environment variables or the optional
//! config file.

use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

/// Long-lived agent worker driven through filesystem IPC
#[derive(Parser, Debug, Default)]
#[command(name = "agent-runner", version, about)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// IPC root directory (overrides NANOCLAW_IPC_DIR)
    #[arg(long)]
    pub ipc_dir: Option<PathBuf>,

    /// Workspace root directory (overrides NANOCLAW_WORKSPACE_DIR)
    #[arg(long)]
    pub workspace_dir: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            ipc_dir: self.ipc_dir.clone(),
            workspace_dir: self.workspace_dir.clone(),
        }
    }
}
