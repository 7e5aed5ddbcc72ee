use tracing::Instrument;

use crate::bot::event::BotEvent;
use crate::bot::handlers::comment::{handle_pr_comment, CommentKind};
use crate::bot::handlers::pull_request::handle_pull_request_updated;
use crate::bot::BotContext;

mod comment;
mod pull_request;

/// Executes a single bot event.
///
/// Returns `true` if the agent was asked to act and finished successfully, `false` if the event
/// was declined or handling it failed. Failures are logged, never propagated.
pub async fn handle_bot_event(event: BotEvent, ctx: &BotContext) -> bool {
    match event {
        BotEvent::PullRequestUpdated(payload) => {
            let span = tracing::info_span!(
                "Pull request updated",
                pr = %payload.pr,
                action = %payload.action
            );
            handle_pull_request_updated(ctx, &payload)
                .instrument(span)
                .await
        }
        BotEvent::IssueComment(comment) => {
            let span = tracing::info_span!(
                "Issue comment",
                pr = %comment.pr,
                author = %comment.comment.author
            );
            handle_pr_comment(ctx, &comment, CommentKind::Issue)
                .instrument(span)
                .await
        }
        BotEvent::ReviewComment(comment) => {
            let span = tracing::info_span!(
                "Review comment",
                pr = %comment.pr,
                author = %comment.comment.author
            );
            handle_pr_comment(ctx, &comment, CommentKind::Review)
                .instrument(span)
                .await
        }
    }
}
