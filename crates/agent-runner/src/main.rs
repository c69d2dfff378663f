//! agent-runner: long-lived nanoclaw worker.
//!
//! Reads one task handoff from stdin, then alternates between running the
//! agent and waiting on the IPC inbox until the host drops a close sentinel.
//! Results go to stdout as framed JSON; logs go to stderr.

use agent_runner::cli::Cli;
use agent_runner::runner;
use clap::Parser;
use runner_core::logging;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();
    runner::run(&cli).await
}
