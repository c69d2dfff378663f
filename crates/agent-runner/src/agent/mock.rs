//! Scripted agent for loop tests and local dry runs.

use super::{Agent, AgentError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Agent that replays a fixed list of outcomes in order
///
/// Once the script runs out, every further call fails. Prompts and session ids
/// are recorded for assertions.
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedAgent {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Agent that answers every listed prompt successfully
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default()
    }

    /// Session ids received so far
    pub fn sessions(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(|(_, s)| s.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn run(&self, prompt: &str, session_id: &str) -> Result<String, AgentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), session_id.to_string()));
        }
        let next = self
            .script
            .lock()
            .map_err(|_| AgentError::Failed("script lock poisoned".to_string()))?
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AgentError::Failed(message)),
            None => Err(AgentError::Failed("scripted agent exhausted".to_string())),
        }
    }
}
