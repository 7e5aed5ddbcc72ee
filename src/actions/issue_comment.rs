use serde_json::Value;

use crate::actions::{parse_params, ActionError};
use crate::bot::with_bot_marker;
use crate::github::api::GithubClient;
use crate::github::{GithubRepoName, PrAddress};

#[derive(serde::Deserialize, Debug)]
pub struct AddIssueCommentParams {
    pub owner: String,
    pub repo: String,
    pub issue_number: u64,
    pub body: String,
}

impl AddIssueCommentParams {
    pub fn from_value(params: &Value) -> Result<Self, ActionError> {
        let params: Self = parse_params(params)?;
        if params.owner.trim().is_empty() || params.repo.trim().is_empty() {
            return Err(ActionError::InvalidParameters(
                "owner and repo must not be empty".to_string(),
            ));
        }
        if params.issue_number == 0 {
            return Err(ActionError::InvalidParameters(
                "issue_number must be positive".to_string(),
            ));
        }
        if params.body.trim().is_empty() {
            return Err(ActionError::InvalidParameters(
                "body must not be empty".to_string(),
            ));
        }
        Ok(params)
    }
}

#[derive(serde::Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    pub comment_id: u64,
}

/// Posts a comment on the conversation of an issue or pull request.
pub async fn add_issue_comment(
    github: &GithubClient,
    params: AddIssueCommentParams,
) -> Result<CreatedComment, ActionError> {
    let pr = PrAddress::new(
        GithubRepoName::new(&params.owner, &params.repo),
        params.issue_number.into(),
    );
    let comment_id = github
        .post_comment(&pr, &with_bot_marker(&params.body))
        .await
        .map_err(ActionError::api("add issue comment"))?;
    Ok(CreatedComment { comment_id })
}
