//! Configuration types for agent-runner.
//!
//! [`RunnerFileConfig`] mirrors the optional TOML file; every field is optional
//! so a partial file only overrides what it names. [`ModelConfig`] is the fully
//! resolved model section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Resolved model endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Model identifier sent with every request
    pub model_id: String,
    /// Bearer token for the endpoint
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.example.com/v1`
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Optional TOML configuration file
///
/// # Example
///
/// ```toml
/// [model]
/// model_id = "gpt-4o-mini"
/// base_url = "https://api.openai.com/v1"
/// temperature = 0.2
///
/// [paths]
/// ipc_dir = "/workspace/ipc"
/// workspace_dir = "/workspace"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerFileConfig {
    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub paths: PathsSection,
}

/// `[model]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSection {
    pub model_id: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

/// `[paths]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsSection {
    pub ipc_dir: Option<PathBuf>,
    pub workspace_dir: Option<PathBuf>,
}
