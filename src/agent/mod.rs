//! The reasoning agent which turns a natural-language instruction into GitHub actions.
use axum::async_trait;
use serde_json::{json, Value};

mod openai;
mod tools;

pub use openai::{OpenAiAgent, OpenAiConfig};
pub use tools::Toolbox;

/// A single task for the agent.
#[derive(Clone, Debug)]
pub struct AgentRequest {
    pub instruction: String,
    /// Shape of the final answer the agent is asked to produce.
    pub response_schema: ResponseSchema,
}

impl AgentRequest {
    pub fn new(instruction: String, response_schema: ResponseSchema) -> Self {
        Self {
            instruction,
            response_schema,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseSchema {
    /// Outcome of reviewing a whole pull request.
    CodeReview,
    /// Outcome of answering a single comment.
    CommentResponse,
}

impl ResponseSchema {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseSchema::CodeReview => "code_review",
            ResponseSchema::CommentResponse => "comment_response",
        }
    }

    /// JSON schema of the final answer.
    ///
    /// The schema only shapes the answer, the bot never inspects the returned value.
    pub fn json_schema(&self) -> Value {
        match self {
            ResponseSchema::CodeReview => json!({
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "Overview of the review that was posted"
                    },
                    "files_reviewed": {
                        "type": "array",
                        "items": { "type": "string" }
                    },
                    "comments_posted": { "type": "integer" }
                },
                "required": ["summary", "files_reviewed", "comments_posted"],
                "additionalProperties": false
            }),
            ResponseSchema::CommentResponse => json!({
                "type": "object",
                "properties": {
                    "response": {
                        "type": "string",
                        "description": "Text of the posted answer"
                    },
                    "posted": { "type": "boolean" }
                },
                "required": ["response", "posted"],
                "additionalProperties": false
            }),
        }
    }
}

/// Executes instructions by planning and performing GitHub actions.
///
/// It is behind a trait so that the event handlers can be tested without a real model.
#[async_trait]
pub trait ReviewAgent: Send + Sync {
    /// Performs the instruction and returns the final structured answer.
    async fn run(&self, request: AgentRequest) -> anyhow::Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_require_all_properties() {
        for schema in [ResponseSchema::CodeReview, ResponseSchema::CommentResponse] {
            let value = schema.json_schema();
            let properties = value["properties"].as_object().unwrap();
            let required: Vec<&str> = value["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            assert_eq!(properties.len(), required.len(), "{}", schema.name());
            assert!(required.iter().all(|name| properties.contains_key(*name)));
        }
    }
}
