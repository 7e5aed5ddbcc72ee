use anyhow::Context;

use crate::github::api::client::GithubClient;
use crate::github::{CommitSha, PrAddress};

/// Identifier of a submitted pull request review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ReviewId(pub u64);

/// A single inline comment inside a review, attached to the post-change side of the diff.
#[derive(serde::Serialize, Debug)]
pub struct InlineComment<'a> {
    pub path: &'a str,
    pub line: u64,
    pub body: &'a str,
    side: DiffSide,
}

impl<'a> InlineComment<'a> {
    pub fn new(path: &'a str, line: u64, body: &'a str) -> Self {
        Self {
            path,
            line,
            body,
            side: DiffSide::Right,
        }
    }
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
enum DiffSide {
    Right,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum ReviewEvent {
    Comment,
}

#[derive(serde::Serialize)]
struct CreateReviewRequest<'a, 'b> {
    commit_id: &'a str,
    event: ReviewEvent,
    comments: &'b [InlineComment<'b>],
}

#[derive(serde::Deserialize)]
struct CreateReviewResponse {
    id: u64,
}

/// Submits one `COMMENT` review containing all the given inline comments.
///
/// Documentation: https://docs.github.com/en/rest/pulls/reviews?apiVersion=2022-11-28#create-a-review-for-a-pull-request
pub async fn create_review(
    repo: &GithubClient,
    pr: &PrAddress,
    commit: &CommitSha,
    comments: &[InlineComment<'_>],
) -> anyhow::Result<ReviewId> {
    let url = format!("/repos/{}/pulls/{}/reviews", pr.repository, pr.number);
    let request = CreateReviewRequest {
        commit_id: commit.as_ref(),
        event: ReviewEvent::Comment,
        comments,
    };

    tracing::debug!(
        "Creating review on {pr} at {commit} with {} comment(s)",
        comments.len()
    );

    let response: CreateReviewResponse = repo
        .client()
        .post(url, Some(&request))
        .await
        .with_context(|| format!("Cannot create review on {pr}"))?;
    Ok(ReviewId(response.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_review_request() {
        let comments = [
            InlineComment::new("src/lib.rs", 3, "Consider a constant"),
            InlineComment::new("src/lib.rs", 10, "Typo"),
        ];
        let request = CreateReviewRequest {
            commit_id: "abc",
            event: ReviewEvent::Comment,
            comments: &comments,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "commit_id": "abc",
                "event": "COMMENT",
                "comments": [
                    {"path": "src/lib.rs", "line": 3, "body": "Consider a constant", "side": "RIGHT"},
                    {"path": "src/lib.rs", "line": 10, "body": "Typo", "side": "RIGHT"}
                ]
            })
        );
    }
}
