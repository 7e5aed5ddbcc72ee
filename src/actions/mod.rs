//! Deterministic GitHub operations that the agent can invoke as tools.
//!
//! Every action validates its parameters before touching the network.
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::github::PrUrlError;

mod file_changes;
mod issue_comment;
mod review_comments;

pub use file_changes::{get_file_before_after, FileChange, GetFileBeforeAfterParams};
pub use issue_comment::{add_issue_comment, AddIssueCommentParams, CreatedComment};
pub use review_comments::{
    create_review_comments, CreateReviewCommentsParams, CreatedReview, ReviewCommentSpec,
};

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error(transparent)]
    InvalidUrl(#[from] PrUrlError),
    #[error("Failed to {action}: {source:#}")]
    Api {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ActionError {
    pub(crate) fn api(action: &'static str) -> impl FnOnce(anyhow::Error) -> ActionError {
        move |source| ActionError::Api { action, source }
    }
}

/// Deserializes untrusted tool parameters into the typed parameters of an action.
pub(crate) fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, ActionError> {
    if !params.is_object() {
        return Err(ActionError::InvalidParameters(
            "parameters must be an object".to_string(),
        ));
    }
    T::deserialize(params).map_err(|error| ActionError::InvalidParameters(error.to_string()))
}
