use std::time::Duration;

use anyhow::Context;
use axum::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::agent::{AgentRequest, ResponseSchema, ReviewAgent, Toolbox};

const SYSTEM_PROMPT: &str = "You are a GitHub assistant that reviews pull requests and answers \
questions about them. Use the available actions to read the changed code and to post your \
review comments and replies. When you are done, answer with the requested JSON object only.";

pub struct OpenAiConfig {
    /// Base URL of an OpenAI compatible API, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: SecretString,
    pub model: String,
    /// Maximum number of model round trips for a single request.
    pub max_turns: usize,
    pub request_timeout: Duration,
}

/// Agent backed by a chat completion model with function calling.
pub struct OpenAiAgent {
    client: reqwest::Client,
    config: OpenAiConfig,
    toolbox: Toolbox,
}

#[derive(serde::Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(serde::Deserialize, Debug)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: FunctionCall,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
struct FunctionCall {
    name: String,
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

impl OpenAiAgent {
    pub fn new(config: OpenAiConfig, toolbox: Toolbox) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Cannot build agent HTTP client")?;
        Ok(Self {
            client,
            config,
            toolbox,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    async fn complete(
        &self,
        messages: &[Value],
        schema: ResponseSchema,
    ) -> anyhow::Result<ChatMessage> {
        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "tools": self.toolbox.definitions(),
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name(),
                    "schema": schema.json_schema()
                }
            }
        });

        let response: ChatResponse = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("Cannot reach the agent API")?
            .error_for_status()
            .context("Agent API returned an error")?
            .json()
            .await
            .context("Cannot deserialize agent response")?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| anyhow::anyhow!("Agent response contains no choices"))
    }
}

#[async_trait]
impl ReviewAgent for OpenAiAgent {
    async fn run(&self, request: AgentRequest) -> anyhow::Result<Value> {
        let mut messages = vec![
            json!({ "role": "system", "content": SYSTEM_PROMPT }),
            json!({ "role": "user", "content": request.instruction }),
        ];

        for turn in 1..=self.config.max_turns {
            let message = self.complete(&messages, request.response_schema).await?;
            if message.tool_calls.is_empty() {
                let content = message.content.unwrap_or_default();
                tracing::debug!("Agent finished after {turn} turn(s)");
                return serde_json::from_str(&content)
                    .with_context(|| format!("Agent answer is not valid JSON: {content}"));
            }

            tracing::debug!(
                "Agent requested {} tool call(s) in turn {turn}",
                message.tool_calls.len()
            );
            messages.push(json!({
                "role": "assistant",
                "content": message.content,
                "tool_calls": message.tool_calls,
            }));
            for call in &message.tool_calls {
                let output = self
                    .toolbox
                    .call(&call.function.name, &call.function.arguments)
                    .await;
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": output.to_string(),
                }));
            }
        }

        Err(anyhow::anyhow!(
            "Agent did not finish within {} turns",
            self.config.max_turns
        ))
    }
}
