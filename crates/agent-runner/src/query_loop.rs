//! Query loop: the runner's control state machine.
//!
//! ```text
//! RunningAgent(prompt) ──ok──> frames ──close?──> Terminated(Closed)
//!        ^                        │
//!        │                        v
//!        └──message── AwaitingNextInput ──close──> Terminated(Closed)
//!
//! RunningAgent(prompt) ──err──> error frame ──> Terminated(AgentFailed)
//! ```
//!
//! The agent call and the inbox wait never overlap. An agent failure is fatal:
//! one error frame, then the loop ends without polling again.

use crate::agent::Agent;
use crate::wait::{IPC_POLL_INTERVAL, WaitOutcome, wait_for_message};
use runner_core::{CloseSentinel, Inbox, IpcPaths, OutputChannel, OutputFrame};
use std::io::{self, Write};
use std::time::Duration;

/// Loop state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Run the agent on this prompt
    RunningAgent(String),
    /// Turn finished, polling for input or close
    AwaitingNextInput,
    /// Final state
    Terminated(LoopExit),
}

/// Why the loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The host asked the runner to stop
    Closed,
    /// The agent failed; an error frame carrying this message was emitted
    AgentFailed(String),
}

pub struct QueryLoop<'a, A: Agent + ?Sized, W: Write> {
    agent: &'a A,
    session_id: String,
    inbox: Inbox,
    close: CloseSentinel,
    output: OutputChannel<W>,
    poll_interval: Duration,
}

impl<'a, A: Agent + ?Sized, W: Write> QueryLoop<'a, A, W> {
    pub fn new(
        agent: &'a A,
        session_id: impl Into<String>,
        ipc: &IpcPaths,
        output: OutputChannel<W>,
    ) -> Self {
        Self {
            agent,
            session_id: session_id.into(),
            inbox: ipc.inbox(),
            close: ipc.close_sentinel(),
            output,
            poll_interval: IPC_POLL_INTERVAL,
        }
    }

    /// Override the wait interval (tests use a short one)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn output(&self) -> &OutputChannel<W> {
        &self.output
    }

    /// Advance one transition.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if a frame cannot be written to the output.
    pub async fn step(&mut self, state: LoopState) -> io::Result<LoopState> {
        match state {
            LoopState::RunningAgent(prompt) => self.run_turn(&prompt).await,
            LoopState::AwaitingNextInput => {
                match wait_for_message(&self.inbox, &self.close, self.poll_interval).await {
                    WaitOutcome::Message(text) => {
                        tracing::info!(len = text.len(), "received follow-up input");
                        Ok(LoopState::RunningAgent(text))
                    }
                    WaitOutcome::Closed => {
                        tracing::info!("close sentinel received, exiting");
                        Ok(LoopState::Terminated(LoopExit::Closed))
                    }
                }
            }
            LoopState::Terminated(exit) => Ok(LoopState::Terminated(exit)),
        }
    }

    /// Drive the loop from `prompt` until it terminates.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the output stream breaks.
    pub async fn run(&mut self, prompt: impl Into<String>) -> io::Result<LoopExit> {
        let mut state = LoopState::RunningAgent(prompt.into());
        loop {
            state = self.step(state).await?;
            if let LoopState::Terminated(exit) = state {
                return Ok(exit);
            }
        }
    }

    async fn run_turn(&mut self, prompt: &str) -> io::Result<LoopState> {
        tracing::info!(session_id = %self.session_id, len = prompt.len(), "starting agent run");

        let reply = match self.agent.run(prompt, &self.session_id).await {
            Ok(reply) => reply,
            Err(e) => {
                let message = e.to_string();
                tracing::error!(session_id = %self.session_id, error = %message, "agent error");
                self.output
                    .emit(&OutputFrame::error(message.clone(), Some(self.session_id.as_str())))?;
                return Ok(LoopState::Terminated(LoopExit::AgentFailed(message)));
            }
        };

        tracing::info!(session_id = %self.session_id, len = reply.len(), "agent run finished");
        if !reply.is_empty() {
            self.output
                .emit(&OutputFrame::success(Some(reply), Some(self.session_id.as_str())))?;
        }
        self.output
            .emit(&OutputFrame::success(None, Some(self.session_id.as_str())))?;

        if self.close.check_and_consume() {
            tracing::info!("close sentinel received after run, exiting");
            return Ok(LoopState::Terminated(LoopExit::Closed));
        }
        Ok(LoopState::AwaitingNextInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ScriptedAgent;
    use runner_core::{FrameReader, FrameStatus};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const FAST: Duration = Duration::from_millis(20);

    fn setup() -> (TempDir, IpcPaths) {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());
        fs::create_dir_all(ipc.input_dir()).unwrap();
        (temp_dir, ipc)
    }

    fn frames<A: Agent + ?Sized>(query_loop: &QueryLoop<'_, A, Vec<u8>>) -> Vec<OutputFrame> {
        FrameReader::new(query_loop.output().get_ref().as_slice())
            .read_all()
            .unwrap()
    }

    #[tokio::test]
    async fn test_success_emits_result_then_end_of_turn() {
        let (_tmp, ipc) = setup();
        let agent = ScriptedAgent::replies(["hi there"]);
        let mut query_loop =
            QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()));

        let next = query_loop
            .step(LoopState::RunningAgent("hello".to_string()))
            .await
            .unwrap();

        assert_eq!(next, LoopState::AwaitingNextInput);
        let frames = frames(&query_loop);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].result.as_deref(), Some("hi there"));
        assert_eq!(frames[0].new_session_id.as_deref(), Some("sess-1"));
        assert!(frames[1].is_end_of_turn());
        assert_eq!(agent.prompts(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_empty_reply_emits_only_end_of_turn() {
        let (_tmp, ipc) = setup();
        let agent = ScriptedAgent::replies([""]);
        let mut query_loop =
            QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()));

        query_loop
            .step(LoopState::RunningAgent("quiet".to_string()))
            .await
            .unwrap();

        let frames = frames(&query_loop);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_end_of_turn());
    }

    #[tokio::test]
    async fn test_follow_up_becomes_next_prompt() {
        let (_tmp, ipc) = setup();
        fs::write(
            ipc.input_dir().join("170000000000-ab12cd.json"),
            r#"{"type":"message","text":"follow up"}"#,
        )
        .unwrap();
        let agent = ScriptedAgent::replies(Vec::<String>::new());
        let mut query_loop = QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()))
            .with_poll_interval(FAST);

        let next = query_loop.step(LoopState::AwaitingNextInput).await.unwrap();

        assert_eq!(next, LoopState::RunningAgent("follow up".to_string()));
        assert!(!ipc.input_dir().join("170000000000-ab12cd.json").exists());
    }

    #[tokio::test]
    async fn test_close_while_awaiting_emits_nothing() {
        let (_tmp, ipc) = setup();
        fs::write(ipc.input_dir().join("_close"), "").unwrap();
        let agent = ScriptedAgent::replies(Vec::<String>::new());
        let mut query_loop = QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()))
            .with_poll_interval(FAST);

        let next = query_loop.step(LoopState::AwaitingNextInput).await.unwrap();

        assert_eq!(next, LoopState::Terminated(LoopExit::Closed));
        assert!(query_loop.output().get_ref().is_empty());
    }

    #[tokio::test]
    async fn test_close_after_run_skips_waiting() {
        let (_tmp, ipc) = setup();
        fs::write(ipc.input_dir().join("_close"), "").unwrap();
        let agent = ScriptedAgent::replies(["done"]);
        let mut query_loop =
            QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()));

        let exit = query_loop.run("last job").await.unwrap();

        assert_eq!(exit, LoopExit::Closed);
        assert_eq!(frames(&query_loop).len(), 2);
    }

    #[tokio::test]
    async fn test_agent_failure_emits_single_error_frame() {
        let (_tmp, ipc) = setup();
        // Queued input must not be consumed once the agent has failed
        fs::write(
            ipc.input_dir().join("170000000000-ab12cd.json"),
            r#"{"type":"message","text":"never read"}"#,
        )
        .unwrap();
        let agent = ScriptedAgent::new([Err("rate limited".to_string())]);
        let mut query_loop =
            QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()));

        let exit = query_loop.run("hello").await.unwrap();

        assert_eq!(exit, LoopExit::AgentFailed("rate limited".to_string()));
        let frames = frames(&query_loop);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].status, FrameStatus::Error);
        assert_eq!(
            serde_json::to_value(&frames[0]).unwrap(),
            json!({"status": "error", "result": null, "error": "rate limited", "newSessionId": "sess-1"})
        );
        assert!(ipc.input_dir().join("170000000000-ab12cd.json").exists());
    }

    #[tokio::test]
    async fn test_terminated_is_absorbing() {
        let (_tmp, ipc) = setup();
        let agent = ScriptedAgent::replies(Vec::<String>::new());
        let mut query_loop =
            QueryLoop::new(&agent, "sess-1", &ipc, OutputChannel::new(Vec::new()));

        let state = LoopState::Terminated(LoopExit::Closed);
        assert_eq!(query_loop.step(state.clone()).await.unwrap(), state);
        assert!(agent.prompts().is_empty());
    }
}
