//! Configuration resolution for agent-runner.
//!
//! The entry point is [`resolve_config`]; see [`resolve`] for the priority
//! chain and [`types`] for the file schema.

mod resolve;
mod types;

pub use resolve::{ConfigError, ConfigOverrides, ResolvedConfig, resolve_config};
pub use types::{ModelConfig, ModelSection, PathsSection, RunnerFileConfig};
