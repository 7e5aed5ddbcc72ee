use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::IgnoredAny;
use serde_json::Value;
use sha2::Sha256;

use crate::bot::event::{
    BotEvent, CommentEvent, PullRequestAction, PullRequestComment, PullRequestUpdated,
};
use crate::bot::is_bot_comment;
use crate::github::server::ServerStateRef;
use crate::github::error::WebhookRejection;
use crate::github::{GithubRepoName, PrAddress, PullRequestNumber};

/// GitHub caps webhook payloads at 25 MB.
const MAX_WEBHOOK_SIZE: usize = 25 * 1024 * 1024;

#[derive(serde::Deserialize, Debug)]
struct WebhookUser {
    login: String,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookRepository {
    name: String,
    owner: WebhookUser,
}

impl WebhookRepository {
    fn into_name(self) -> GithubRepoName {
        GithubRepoName::new(&self.owner.login, &self.name)
    }

    fn pr_address(self, number: u64) -> anyhow::Result<PrAddress> {
        if number == 0 {
            return Err(anyhow::anyhow!(
                "Pull request number in {} must be positive",
                self.into_name()
            ));
        }
        Ok(PrAddress::new(self.into_name(), PullRequestNumber(number)))
    }
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPullRequest {
    number: u64,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookIssue {
    number: u64,
    /// Only present if the issue is a pull request.
    pull_request: Option<IgnoredAny>,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookComment {
    body: Option<String>,
    user: WebhookUser,
    path: Option<String>,
    line: Option<u64>,
    position: Option<u64>,
}

impl WebhookComment {
    fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    fn into_comment_event(self) -> CommentEvent {
        CommentEvent {
            body: self.body.unwrap_or_default(),
            author: self.user.login,
            path: self.path,
            line: self.line.or(self.position),
        }
    }
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPullRequestEvent {
    repository: WebhookRepository,
    pull_request: WebhookPullRequest,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookIssueCommentEvent {
    repository: WebhookRepository,
    issue: WebhookIssue,
    comment: WebhookComment,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookReviewCommentEvent {
    repository: WebhookRepository,
    pull_request: WebhookPullRequest,
    comment: WebhookComment,
}

/// axum extractor for GitHub webhook events.
///
/// Contains `None` if the webhook does not require any reaction from the bot.
#[derive(Debug)]
pub struct GitHubWebhook(pub Option<BotEvent>);

/// Extracts a webhook event from a HTTP request.
#[async_trait]
impl FromRequest<ServerStateRef> for GitHubWebhook {
    type Rejection = WebhookRejection;

    async fn from_request(request: Request, state: &ServerStateRef) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let Some(event_type) = parts
            .headers
            .get("x-github-event")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
        else {
            return Err(WebhookRejection::MissingEventHeader);
        };

        let body: Bytes = axum::body::to_bytes(body, MAX_WEBHOOK_SIZE)
            .await
            .map_err(|error| {
                WebhookRejection::MalformedPayload(anyhow::anyhow!(
                    "Cannot read webhook body: {error:?}"
                ))
            })?;

        if let Some(secret) = state.get_webhook_secret() {
            if !verify_gh_signature(&parts.headers, &body, secret) {
                return Err(WebhookRejection::InvalidSignature);
            }
        }

        tracing::info!("Received {event_type} event");
        parse_webhook_event(&event_type, &body)
            .map(GitHubWebhook)
            .map_err(WebhookRejection::MalformedPayload)
    }
}

/// Decides which (if any) bot event corresponds to the given webhook.
fn parse_webhook_event(event_type: &str, body: &[u8]) -> anyhow::Result<Option<BotEvent>> {
    let payload: Value = serde_json::from_slice(body)?;
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match (event_type, action.as_str()) {
        ("pull_request", "opened" | "synchronize") => {
            let action = if action == "opened" {
                PullRequestAction::Opened
            } else {
                PullRequestAction::Synchronize
            };
            let event: WebhookPullRequestEvent = serde_json::from_value(payload)?;
            Ok(Some(BotEvent::PullRequestUpdated(PullRequestUpdated {
                pr: event.repository.pr_address(event.pull_request.number)?,
                action,
            })))
        }
        ("issue_comment", "created") => {
            let event: WebhookIssueCommentEvent = serde_json::from_value(payload)?;
            if is_bot_comment(event.comment.body()) {
                tracing::trace!("Ignoring comment because it was authored by this bot");
                return Ok(None);
            }
            // We only care about pull request comments
            if event.issue.pull_request.is_none() {
                tracing::debug!(
                    "Ignoring comment on issue #{} because it is not a pull request",
                    event.issue.number
                );
                return Ok(None);
            }
            Ok(Some(BotEvent::IssueComment(PullRequestComment {
                pr: event.repository.pr_address(event.issue.number)?,
                comment: event.comment.into_comment_event(),
            })))
        }
        ("pull_request_review_comment", "created") => {
            let event: WebhookReviewCommentEvent = serde_json::from_value(payload)?;
            if is_bot_comment(event.comment.body()) {
                tracing::trace!("Ignoring review comment because it was authored by this bot");
                return Ok(None);
            }
            Ok(Some(BotEvent::ReviewComment(PullRequestComment {
                pr: event.repository.pr_address(event.pull_request.number)?,
                comment: event.comment.into_comment_event(),
            })))
        }
        ("pull_request" | "issue_comment" | "pull_request_review_comment", _) => {
            tracing::debug!("Ignoring {event_type} event with action `{action}`");
            Ok(None)
        }
        _ => {
            tracing::debug!("Ignoring unknown event type {event_type}");
            Ok(None)
        }
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Verifies that the request is properly signed by GitHub with SHA-256 and the passed `secret`.
fn verify_gh_signature(
    headers: &HeaderMap<HeaderValue>,
    body: &[u8],
    secret: &WebhookSecret,
) -> bool {
    let Some(signature) = headers.get("x-hub-signature-256").map(|v| v.as_bytes()) else {
        return false;
    };
    let Some(signature) = signature
        .get(b"sha256=".len()..)
        .and_then(|v| hex::decode(v).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose().as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Wrapper for a secret which is zeroed on drop and can be exposed only through the [`WebhookSecret::expose`] method.
pub struct WebhookSecret(SecretString);

impl WebhookSecret {
    pub fn new(secret: String) -> Self {
        Self(SecretString::new(secret))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }
}
