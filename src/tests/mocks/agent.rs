use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::agent::{OpenAiAgent, OpenAiConfig, Toolbox};

pub const TEST_AGENT_KEY: &str = "agent-key";

/// Simulated OpenAI compatible chat completion API.
pub struct AgentMockServer {
    mock_server: MockServer,
}

impl AgentMockServer {
    pub async fn start() -> Self {
        Self {
            mock_server: MockServer::start().await,
        }
    }

    pub fn agent(&self, toolbox: Toolbox, max_turns: usize) -> OpenAiAgent {
        OpenAiAgent::new(
            OpenAiConfig {
                api_base: format!("{}/v1", self.mock_server.uri()),
                api_key: SecretString::new(TEST_AGENT_KEY.to_string()),
                model: "test-model".to_string(),
                max_turns,
                request_timeout: std::time::Duration::from_secs(10),
            },
            toolbox,
        )
        .unwrap()
    }

    /// The next completion asks for a single tool call.
    ///
    /// Tool calls are answered before final answers mounted by [`AgentMockServer::mock_answer`].
    pub async fn mock_tool_call(&self, name: &str, arguments: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", format!("Bearer {TEST_AGENT_KEY}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": arguments.to_string()
                    }
                }]
            }))))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&self.mock_server)
            .await;
    }

    /// Every completion returns `answer` as the final structured answer.
    pub async fn mock_answer(&self, answer: Value) {
        self.mock_raw_answer(&answer.to_string()).await;
    }

    pub async fn mock_raw_answer(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": content
            }))))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_error(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.mock_server)
            .await;
    }

    /// Request bodies of all completions, in the order in which they were received.
    pub async fn completion_requests(&self) -> Vec<Value> {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request: &Request| request.body_json().unwrap())
            .collect()
    }
}

fn completion(message: Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": "stop"
        }]
    })
}
