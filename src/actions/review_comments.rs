use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::actions::{parse_params, ActionError};
use crate::bot::with_bot_marker;
use crate::github::api::{GithubClient, InlineComment, ReviewId};
use crate::github::PrAddress;

/// One inline comment of a batch.
///
/// Additional properties are ignored.
#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReviewCommentSpec {
    #[serde(deserialize_with = "deserialize_line")]
    pub line: u64,
    pub comment: String,
}

/// Accepts any JSON number with an integral, non-negative value (`3` or `3.0`).
fn deserialize_line<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(line) = number.as_u64() {
        return Ok(line);
    }
    match number.as_f64() {
        Some(line) if line >= 0.0 && line.fract() == 0.0 && line <= u64::MAX as f64 => {
            Ok(line as u64)
        }
        _ => Err(D::Error::custom(format!("invalid line number {number}"))),
    }
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewCommentsParams {
    pub pr_url: String,
    pub filename: String,
    pub comments: Vec<ReviewCommentSpec>,
}

impl CreateReviewCommentsParams {
    pub fn from_value(params: &Value) -> Result<Self, ActionError> {
        let params: Self = parse_params(params)?;
        if params.filename.trim().is_empty() {
            return Err(ActionError::InvalidParameters(
                "filename must not be empty".to_string(),
            ));
        }
        if params.comments.is_empty() {
            return Err(ActionError::InvalidParameters(
                "comments must not be empty".to_string(),
            ));
        }
        if let Some(comment) = params.comments.iter().find(|comment| comment.line == 0) {
            return Err(ActionError::InvalidParameters(format!(
                "line numbers start at 1 (comment `{}`)",
                comment.comment
            )));
        }
        Ok(params)
    }
}

#[derive(serde::Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReview {
    pub review_id: ReviewId,
    pub comment_count: usize,
}

/// Posts all comments as a single review on the head commit of the PR.
pub async fn create_review_comments(
    github: &GithubClient,
    params: CreateReviewCommentsParams,
) -> Result<CreatedReview, ActionError> {
    let pr = PrAddress::parse_url(&params.pr_url)?;

    let refs = github
        .get_pull_request_refs(&pr)
        .await
        .map_err(ActionError::api("create review comments"))?;

    let bodies: Vec<_> = params
        .comments
        .iter()
        .map(|comment| with_bot_marker(&comment.comment))
        .collect();
    let comments: Vec<InlineComment> = params
        .comments
        .iter()
        .zip(&bodies)
        .map(|(comment, body)| InlineComment::new(&params.filename, comment.line, body))
        .collect();

    let review_id = github
        .create_review(&pr, &refs.head, &comments)
        .await
        .map_err(ActionError::api("create review comments"))?;

    tracing::info!(
        "Created review {} with {} comment(s) on {pr}",
        review_id.0,
        comments.len()
    );
    Ok(CreatedReview {
        review_id,
        comment_count: comments.len(),
    })
}
