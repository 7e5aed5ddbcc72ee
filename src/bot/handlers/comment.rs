use tracing::Span;

use crate::agent::{AgentRequest, ResponseSchema};
use crate::bot::event::PullRequestComment;
use crate::bot::{should_respond, BotContext, BOT_MARKER};
use crate::utils::logging::LogError;

#[derive(Clone, Copy, Debug)]
pub(super) enum CommentKind {
    /// Comment in the PR conversation.
    Issue,
    /// Inline comment on the PR diff.
    Review,
}

/// Lets the agent answer a PR comment, if the comment asks for it.
pub(super) async fn handle_pr_comment(
    ctx: &BotContext,
    comment: &PullRequestComment,
    kind: CommentKind,
) -> bool {
    if !should_respond(&comment.comment.body, ctx.bot_name()) {
        tracing::debug!("Comment does not ask for a response, ignoring it");
        return false;
    }

    tracing::info!("Responding to {kind:?} comment on PR {}", comment.pr);

    let instruction = match kind {
        CommentKind::Issue => issue_comment_instruction(comment),
        CommentKind::Review => review_comment_instruction(comment),
    };
    let request = AgentRequest::new(instruction, ResponseSchema::CommentResponse);
    match ctx.agent.run(request).await {
        Ok(result) => {
            tracing::debug!("Agent result: {result}");
            tracing::info!("Response posted to comment on PR {}", comment.pr);
            true
        }
        Err(error) => {
            Span::current().log_error(&format!("Responding to comment on {}", comment.pr), &error);
            false
        }
    }
}

fn issue_comment_instruction(comment: &PullRequestComment) -> String {
    let pr = &comment.pr;
    format!(
        r#"Respond to this comment on pull request #{number} in {repo} ({url}):

Comment: {body}
Comment Author: {author}

1. Write a brief, helpful answer that addresses the comment directly.
2. Post the answer as a comment on the pull request.
3. Stay concise and focused on the points raised in the comment.

IMPORTANT: Your comment MUST start with this exact prefix: {BOT_MARKER}"#,
        number = pr.number,
        repo = pr.repository,
        url = pr.html_url(),
        body = comment.comment.body,
        author = comment.comment.author,
    )
}

fn review_comment_instruction(comment: &PullRequestComment) -> String {
    let pr = &comment.pr;
    let line = comment
        .comment
        .line
        .map(|line| line.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        r#"Respond to this code review comment on pull request #{number} in {repo} ({url}):

Comment: {body}
Comment Author: {author}
File: {path}
Line: {line}

1. Load the content of the file and focus on the code around the commented line.
2. Write a brief, technical answer that addresses the comment, with code examples where useful.
3. Post the answer as a comment on the pull request.

IMPORTANT: Your comment MUST start with this exact prefix: {BOT_MARKER}"#,
        number = pr.number,
        repo = pr.repository,
        url = pr.html_url(),
        body = comment.comment.body,
        author = comment.comment.author,
        path = comment.comment.path.as_deref().unwrap_or("N/A"),
    )
}
