//! Agent backed by an OpenAI-compatible chat completions endpoint.
//!
//! One [`Agent::run`] call is one *run*: the prompt is sent together with the
//! system prompt, recent session history and the IPC tool definitions. Tool
//! calls are executed locally and fed back until the model answers with plain
//! content. History lives in memory only and keeps the last
//! [`HISTORY_RUNS`] prompt/answer pairs per session.

use super::{Agent, AgentError};
use crate::config::ModelConfig;
use crate::tools::IpcTools;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Maximum model round-trips spent on tool calls within one run
pub const MAX_TOOL_ROUNDS: usize = 16;

/// Prompt/answer pairs replayed from earlier runs in the same session
pub const HISTORY_RUNS: usize = 10;

/// Chat message in the wire format of the completions API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, output: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(output),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,

    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,

    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible agent with IPC tools
pub struct OpenAiAgent {
    client: reqwest::Client,
    config: ModelConfig,
    system_prompt: String,
    tools: IpcTools,
    history: Mutex<HashMap<String, VecDeque<(String, String)>>>,
}

impl OpenAiAgent {
    /// Build the agent and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        config: ModelConfig,
        system_prompt: String,
        tools: IpcTools,
    ) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            system_prompt,
            tools,
            history: Mutex::new(HashMap::new()),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn history_for(&self, session_id: &str) -> Vec<ChatMessage> {
        let Ok(history) = self.history.lock() else {
            return Vec::new();
        };
        history
            .get(session_id)
            .map(|runs| {
                runs.iter()
                    .flat_map(|(prompt, answer)| {
                        [ChatMessage::text("user", prompt), ChatMessage::text("assistant", answer)]
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn remember(&self, session_id: &str, prompt: &str, answer: &str) {
        if let Ok(mut history) = self.history.lock() {
            let runs = history.entry(session_id.to_string()).or_default();
            runs.push_back((prompt.to_string(), answer.to_string()));
            while runs.len() > HISTORY_RUNS {
                runs.pop_front();
            }
        }
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<ChatMessage, AgentError> {
        let mut body = json!({
            "model": self.config.model_id,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": false,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
        }

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AgentError::MalformedResponse("response has no choices".to_string()))
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    async fn run(&self, prompt: &str, session_id: &str) -> Result<String, AgentError> {
        let mut messages = vec![ChatMessage::text("system", &self.system_prompt)];
        messages.extend(self.history_for(session_id));
        messages.push(ChatMessage::text("user", prompt));
        let tools = self.tools.definitions();

        for round in 0..MAX_TOOL_ROUNDS {
            let reply = self.complete(&messages, &tools).await?;
            let calls = reply.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                self.remember(session_id, prompt, &answer);
                return Ok(answer);
            }

            tracing::debug!(round, calls = calls.len(), "model requested tools");
            messages.push(reply);
            for call in &calls {
                let output = self.tools.dispatch(&call.function.name, &call.function.arguments);
                messages.push(ChatMessage::tool_result(&call.id, output));
            }
        }

        Err(AgentError::ToolLoopExceeded(MAX_TOOL_ROUNDS))
    }
}
