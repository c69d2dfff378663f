//! agent-runner library crate.
//!
//! Provides the query loop, wait discipline, IPC tools, agent backends and
//! configuration for the `agent-runner` binary. Exposed as a library for
//! integration testing.

pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod prompt;
pub mod query_loop;
pub mod runner;
pub mod startup;
pub mod tools;
pub mod wait;

pub use query_loop::{LoopExit, LoopState, QueryLoop};
