use serde::Serialize;
use serde_json::{json, Value};

use crate::actions::{
    add_issue_comment, create_review_comments, get_file_before_after, parse_params,
    ActionError, AddIssueCommentParams, CreateReviewCommentsParams, GetFileBeforeAfterParams,
};
use crate::github::api::GithubClient;

pub const CREATE_REVIEW_COMMENTS: &str = "create_review_comments";
pub const GET_FILE_BEFORE_AFTER: &str = "get_file_before_after";
pub const ADD_ISSUE_COMMENT: &str = "add_issue_comment";

/// The set of actions exposed to the agent as callable tools.
#[derive(Clone)]
pub struct Toolbox {
    github: GithubClient,
    file_fetch_concurrency: usize,
}

impl Toolbox {
    pub fn new(github: GithubClient, file_fetch_concurrency: usize) -> Self {
        Self {
            github,
            file_fetch_concurrency,
        }
    }

    /// Tool definitions in the OpenAI function calling format.
    pub fn definitions(&self) -> Vec<Value> {
        vec![
            function(
                CREATE_REVIEW_COMMENTS,
                "Creates a review with inline comments on a single file of a GitHub pull request",
                json!({
                    "type": "object",
                    "properties": {
                        "prUrl": {
                            "type": "string",
                            "description": "Full URL of the GitHub PR (e.g. https://github.com/owner/repo/pull/number)"
                        },
                        "filename": {
                            "type": "string",
                            "description": "Path of the file to comment on"
                        },
                        "comments": {
                            "type": "array",
                            "description": "Comments with the line numbers (in the new version of the file) they belong to",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "line": { "type": "integer" },
                                    "comment": { "type": "string" }
                                },
                                "required": ["line", "comment"]
                            }
                        }
                    },
                    "required": ["prUrl", "filename", "comments"]
                }),
            ),
            function(
                GET_FILE_BEFORE_AFTER,
                "Gets the content of every file changed in a GitHub pull request, before and after the change",
                json!({
                    "type": "object",
                    "properties": {
                        "prUrl": {
                            "type": "string",
                            "description": "Full URL of the GitHub PR (e.g. https://github.com/owner/repo/pull/number)"
                        }
                    },
                    "required": ["prUrl"]
                }),
            ),
            function(
                ADD_ISSUE_COMMENT,
                "Posts a comment on the conversation of a GitHub issue or pull request",
                json!({
                    "type": "object",
                    "properties": {
                        "owner": { "type": "string" },
                        "repo": { "type": "string" },
                        "issue_number": { "type": "integer" },
                        "body": { "type": "string" }
                    },
                    "required": ["owner", "repo", "issue_number", "body"]
                }),
            ),
        ]
    }

    /// Executes a tool call requested by the agent.
    ///
    /// Failures are reported back as `{"error": ...}` so that the agent can react to them.
    pub async fn call(&self, name: &str, arguments: &str) -> Value {
        tracing::debug!("Calling tool {name} with {arguments}");
        let result = match serde_json::from_str::<Value>(arguments) {
            Ok(params) => self.dispatch(name, &params).await,
            Err(error) => Err(ActionError::InvalidParameters(format!(
                "arguments are not valid JSON: {error}"
            ))),
        };
        match result {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!("Tool {name} failed: {error}");
                json!({ "error": error.to_string() })
            }
        }
    }

    async fn dispatch(&self, name: &str, params: &Value) -> Result<Value, ActionError> {
        match name {
            CREATE_REVIEW_COMMENTS => {
                let params = CreateReviewCommentsParams::from_value(params)?;
                to_output(create_review_comments(&self.github, params).await?)
            }
            GET_FILE_BEFORE_AFTER => {
                let params: GetFileBeforeAfterParams = parse_params(params)?;
                to_output(
                    get_file_before_after(&self.github, &params.pr_url, self.file_fetch_concurrency)
                        .await?,
                )
            }
            ADD_ISSUE_COMMENT => {
                let params = AddIssueCommentParams::from_value(params)?;
                to_output(add_issue_comment(&self.github, params).await?)
            }
            _ => Err(ActionError::InvalidParameters(format!(
                "unknown tool `{name}`"
            ))),
        }
    }
}

fn function(name: &str, description: &str, parameters: Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": parameters
        }
    })
}

fn to_output<T: Serialize>(value: T) -> Result<Value, ActionError> {
    serde_json::to_value(value).map_err(|error| ActionError::Api {
        action: "serialize tool output",
        source: error.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{default_pr, GitHubMockServer};

    #[tokio::test]
    async fn definitions_name_all_actions() {
        let gh = GitHubMockServer::start().await;
        let names: Vec<_> = Toolbox::new(gh.client(), 1)
            .definitions()
            .iter()
            .map(|tool| tool["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![CREATE_REVIEW_COMMENTS, GET_FILE_BEFORE_AFTER, ADD_ISSUE_COMMENT]
        );
    }

    #[tokio::test]
    async fn unknown_tool() {
        let gh = GitHubMockServer::start().await;
        let output = Toolbox::new(gh.client(), 1).call("merge_pr", "{}").await;
        assert_eq!(
            output,
            json!({ "error": "Invalid parameters: unknown tool `merge_pr`" })
        );
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported() {
        let gh = GitHubMockServer::start().await;
        let output = Toolbox::new(gh.client(), 1)
            .call(CREATE_REVIEW_COMMENTS, "{not json")
            .await;
        assert!(output["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid parameters: arguments are not valid JSON"));
        assert!(gh.received_requests().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_line_is_rejected_before_network() {
        let gh = GitHubMockServer::start().await;
        let output = Toolbox::new(gh.client(), 1)
            .call(
                CREATE_REVIEW_COMMENTS,
                &json!({
                    "prUrl": "https://github.com/owner/name/pull/1",
                    "filename": "src/lib.rs",
                    "comments": [{"line": "ten", "comment": "Nit"}]
                })
                .to_string(),
            )
            .await;
        assert!(output.get("error").is_some());
        assert!(gh.received_requests().await.is_empty());
    }

    #[tokio::test]
    async fn call_get_file_before_after() {
        let gh = GitHubMockServer::start().await;
        let pr = default_pr();
        gh.mock_pull_request(&pr).await;
        gh.mock_files(&pr, &[("a.rs", "added")]).await;
        gh.mock_content(&pr.repository, "a.rs", "head-sha", "fn a() {}")
            .await;

        let output = Toolbox::new(gh.client(), 4)
            .call(
                GET_FILE_BEFORE_AFTER,
                r#"{"prUrl": "https://github.com/owner/name/pull/1"}"#,
            )
            .await;
        assert_eq!(
            output,
            json!([{ "filename": "a.rs", "before_content": null, "after_content": "fn a() {}" }])
        );
    }

    #[tokio::test]
    async fn call_add_issue_comment() {
        let gh = GitHubMockServer::start().await;
        gh.mock_create_comment(&default_pr(), 9).await;

        let output = Toolbox::new(gh.client(), 1)
            .call(
                ADD_ISSUE_COMMENT,
                r#"{"owner": "owner", "repo": "name", "issue_number": 1, "body": "Thanks"}"#,
            )
            .await;
        assert_eq!(output, json!({ "commentId": 9 }));
    }
}
