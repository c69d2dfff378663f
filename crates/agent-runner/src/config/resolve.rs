//! Config resolution for agent-runner.
//!
//! Resolves [`ResolvedConfig`] from multiple sources with the following priority
//! (highest to lowest):
//!
//! 1. CLI flags ([`ConfigOverrides`])
//! 2. Environment variables (`NANOCLAW_*`, then the legacy `AGNO_*` model names)
//! 3. Optional TOML file given with `--config`
//! 4. Compiled-in defaults

use super::types::{
    DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE, ModelConfig,
    RunnerFileConfig,
};
use runner_core::paths::{DEFAULT_IPC_DIR, DEFAULT_WORKSPACE_DIR, IpcPaths, WorkspacePaths};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const ENV_IPC_DIR: &str = "NANOCLAW_IPC_DIR";
pub const ENV_WORKSPACE_DIR: &str = "NANOCLAW_WORKSPACE_DIR";
pub const ENV_MODEL_ID: &str = "NANOCLAW_MODEL_ID";
pub const ENV_API_KEY: &str = "NANOCLAW_API_KEY";
pub const ENV_BASE_URL: &str = "NANOCLAW_BASE_URL";
pub const ENV_TEMPERATURE: &str = "NANOCLAW_TEMPERATURE";
pub const ENV_MAX_TOKENS: &str = "NANOCLAW_MAX_TOKENS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "NANOCLAW_REQUEST_TIMEOUT_SECS";

// Model variables understood by existing container hosts, consulted after the
// `NANOCLAW_*` name.
pub const LEGACY_ENV_MODEL_ID: &str = "AGNO_MODEL_ID";
pub const LEGACY_ENV_API_KEY: &str = "AGNO_API_KEY";
pub const LEGACY_ENV_BASE_URL: &str = "AGNO_BASE_URL";
pub const LEGACY_ENV_TEMPERATURE: &str = "AGNO_TEMPERATURE";
pub const LEGACY_ENV_MAX_TOKENS: &str = "AGNO_MAX_TOKENS";

/// Configuration error. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent from every source
    #[error("{0} environment variable is required")]
    MissingSetting(&'static str),

    /// A setting is present but unparseable
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Path to a TOML config file
    pub config_path: Option<PathBuf>,
    /// Override the IPC root
    pub ipc_dir: Option<PathBuf>,
    /// Override the workspace root
    pub workspace_dir: Option<PathBuf>,
}

/// Fully resolved runner configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model: ModelConfig,
    pub ipc: IpcPaths,
    pub workspace: WorkspacePaths,
}

/// Resolve configuration from flags, process environment, file and defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the config file is unreadable or invalid, if a
/// numeric setting does not parse, or if model id, API key or base URL is
/// missing.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(overrides, |name| std::env::var(name).ok())
}

/// Same as [`resolve_config`] with an injectable environment lookup
pub(crate) fn resolve_with_env<F>(
    overrides: &ConfigOverrides,
    env: F,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match &overrides.config_path {
        Some(path) => load_config_file(path)?,
        None => RunnerFileConfig::default(),
    };
    // Empty values are treated as "not set"
    let env = |name: &str| env(name).filter(|v| !v.is_empty());

    let ipc_dir = overrides
        .ipc_dir
        .clone()
        .or_else(|| env(ENV_IPC_DIR).map(PathBuf::from))
        .or(file.paths.ipc_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IPC_DIR));
    let workspace_dir = overrides
        .workspace_dir
        .clone()
        .or_else(|| env(ENV_WORKSPACE_DIR).map(PathBuf::from))
        .or(file.paths.workspace_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_DIR));

    let section = file.model;
    let model_id = lookup(&env, &[ENV_MODEL_ID, LEGACY_ENV_MODEL_ID])
        .map(|(_, v)| v)
        .or(section.model_id)
        .ok_or(ConfigError::MissingSetting(ENV_MODEL_ID))?;
    let api_key = lookup(&env, &[ENV_API_KEY, LEGACY_ENV_API_KEY])
        .map(|(_, v)| v)
        .or(section.api_key)
        .ok_or(ConfigError::MissingSetting(ENV_API_KEY))?;
    let base_url = lookup(&env, &[ENV_BASE_URL, LEGACY_ENV_BASE_URL])
        .map(|(_, v)| v)
        .or(section.base_url)
        .ok_or(ConfigError::MissingSetting(ENV_BASE_URL))?;

    let temperature = parse_env(lookup(&env, &[ENV_TEMPERATURE, LEGACY_ENV_TEMPERATURE]))?
        .or(section.temperature)
        .unwrap_or(DEFAULT_TEMPERATURE);
    let max_tokens = parse_env(lookup(&env, &[ENV_MAX_TOKENS, LEGACY_ENV_MAX_TOKENS]))?
        .or(section.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);
    let request_timeout_secs = parse_env(lookup(&env, &[ENV_REQUEST_TIMEOUT_SECS]))?
        .or(section.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    Ok(ResolvedConfig {
        model: ModelConfig {
            model_id,
            api_key,
            base_url,
            temperature,
            max_tokens,
            request_timeout_secs,
        },
        ipc: IpcPaths::new(ipc_dir),
        workspace: WorkspacePaths::new(workspace_dir),
    })
}

fn load_config_file(path: &Path) -> Result<RunnerFileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// First set variable among `names`, with the name it was found under
fn lookup<F>(env: &F, names: &[&'static str]) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    names.iter().find_map(|name| env(name).map(|value| (*name, value)))
}

fn parse_env<T: FromStr>(found: Option<(&'static str, String)>) -> Result<Option<T>, ConfigError> {
    match found {
        None => Ok(None),
        Some((name, value)) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
