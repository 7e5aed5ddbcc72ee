use std::fmt::{Display, Formatter};

use crate::github::PrAddress;

#[derive(Debug)]
pub enum BotEvent {
    /// A pull request was opened, or new commits were pushed to it.
    PullRequestUpdated(PullRequestUpdated),
    /// A comment was posted on the conversation of a pull request.
    IssueComment(PullRequestComment),
    /// An inline comment was posted on the diff of a pull request.
    ReviewComment(PullRequestComment),
}

impl BotEvent {
    pub fn pr(&self) -> &PrAddress {
        match self {
            BotEvent::PullRequestUpdated(payload) => &payload.pr,
            BotEvent::IssueComment(comment) | BotEvent::ReviewComment(comment) => &comment.pr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestAction {
    Opened,
    Synchronize,
}

impl Display for PullRequestAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestAction::Opened => f.write_str("opened"),
            PullRequestAction::Synchronize => f.write_str("synchronize"),
        }
    }
}

#[derive(Debug)]
pub struct PullRequestUpdated {
    pub pr: PrAddress,
    pub action: PullRequestAction,
}

#[derive(Debug)]
pub struct PullRequestComment {
    pub pr: PrAddress,
    pub comment: CommentEvent,
}

/// Normalized view of an issue comment or of an inline review comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEvent {
    pub body: String,
    pub author: String,
    /// File the comment is attached to (review comments only).
    pub path: Option<String>,
    /// Line of the diff the comment is attached to (review comments only).
    pub line: Option<u64>,
}
