//! Process lifecycle: handoff, configuration, then the query loop.

use crate::agent::OpenAiAgent;
use crate::cli::Cli;
use crate::config::resolve_config;
use crate::context::RunnerContext;
use crate::prompt::build_system_prompt;
use crate::query_loop::{LoopExit, QueryLoop};
use crate::startup::{initial_prompt, read_handoff};
use crate::tools::IpcTools;
use runner_core::{OutputChannel, OutputFrame};
use std::io::{Read, Write};
use std::process::ExitCode;

/// Exit code for startup failures
pub const EXIT_STARTUP_FAILURE: u8 = 1;

/// Run the worker against stdin and stdout.
///
/// # Errors
///
/// Returns an error only if stdout breaks; every other failure is reported as
/// an error frame and reflected in the exit code.
pub async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let code = run_with(cli, std::io::stdin().lock(), OutputChannel::stdout()).await?;
    Ok(ExitCode::from(code))
}

/// [`run`] over arbitrary input and output streams, returning the exit code.
///
/// Startup failures (bad handoff, bad configuration) emit one error frame and
/// yield [`EXIT_STARTUP_FAILURE`]. Once the loop has started the exit code is 0, including
/// after an agent failure: the error frame is the report.
pub async fn run_with<R: Read, W: Write>(
    cli: &Cli,
    input: R,
    mut output: OutputChannel<W>,
) -> anyhow::Result<u8> {
    let handoff = match read_handoff(input) {
        Ok(handoff) => handoff,
        Err(e) => return fail_startup(&mut output, e.to_string(), None),
    };
    tracing::info!(group_folder = %handoff.group_folder, "received input");

    let config = match resolve_config(&cli.overrides()) {
        Ok(config) => config,
        Err(e) => return fail_startup(&mut output, e.to_string(), None),
    };

    let ctx = RunnerContext::from_input(&handoff);
    let inbox = config.ipc.inbox();
    if inbox.close_sentinel().clear_stale() {
        tracing::debug!("removed stale close sentinel");
    }
    let prompt = initial_prompt(&handoff, &inbox);

    let system_prompt = build_system_prompt(&ctx, &config.workspace);
    let tools = IpcTools::new(config.ipc.clone(), ctx.clone());
    let agent = match OpenAiAgent::new(config.model, system_prompt, tools) {
        Ok(agent) => agent,
        Err(e) => return fail_startup(&mut output, e.to_string(), Some(ctx.session_id.as_str())),
    };

    let mut query_loop = QueryLoop::new(&agent, ctx.session_id.as_str(), &config.ipc, output);
    match query_loop.run(prompt).await? {
        LoopExit::Closed => tracing::info!("runner closed"),
        LoopExit::AgentFailed(message) => {
            tracing::warn!(error = %message, "runner stopped after agent failure");
        }
    }
    Ok(0)
}

fn fail_startup<W: Write>(
    output: &mut OutputChannel<W>,
    message: String,
    session_id: Option<&str>,
) -> anyhow::Result<u8> {
    tracing::error!(error = %message, "startup failed");
    output.emit(&OutputFrame::error(message, session_id))?;
    Ok(EXIT_STARTUP_FAILURE)
}
