//! The language-model agent as seen by the query loop.
//!
//! The loop only needs one capability: turn a prompt into text within a
//! session, or fail. [`OpenAiAgent`] talks to an OpenAI-compatible chat
//! completions endpoint; [`ScriptedAgent`] replays canned outcomes for tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::ScriptedAgent;
pub use openai::OpenAiAgent;

/// Errors surfaced by an agent run. Every variant is fatal to the runner.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport-level failure talking to the model endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The endpoint answered with something that is not a chat completion
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The model kept calling tools without producing an answer
    #[error("Model exceeded {0} tool-call rounds without a final answer")]
    ToolLoopExceeded(usize),

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

/// Opaque conversational agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run one prompt within `session_id`, returning the reply text.
    ///
    /// An empty string means the agent finished without a textual result.
    async fn run(&self, prompt: &str, session_id: &str) -> Result<String, AgentError>;
}
