use tracing::Span;

use crate::agent::{AgentRequest, ResponseSchema};
use crate::bot::event::PullRequestUpdated;
use crate::bot::{BotContext, BOT_MARKER};
use crate::github::PrAddress;
use crate::utils::logging::LogError;

/// Asks the agent to review a freshly opened (or updated) pull request.
pub(super) async fn handle_pull_request_updated(
    ctx: &BotContext,
    payload: &PullRequestUpdated,
) -> bool {
    tracing::info!("Reviewing PR {}", payload.pr);

    let request = AgentRequest::new(review_instruction(&payload.pr), ResponseSchema::CodeReview);
    match ctx.agent.run(request).await {
        Ok(result) => {
            tracing::debug!("Agent result: {result}");
            tracing::info!("Review with line comments completed for PR {}", payload.pr);
            true
        }
        Err(error) => {
            Span::current().log_error(&format!("Reviewing PR {}", payload.pr), &error);
            false
        }
    }
}

fn review_instruction(pr: &PrAddress) -> String {
    format!(
        r#"Review pull request #{number} in {repo} ({url}).
Look at the changed files and leave inline review comments on the specific lines that deserve attention.

Afterwards, post a single comment on the pull request with an overview of what you reviewed and what you found.

IMPORTANT: Every comment you post MUST start with this exact prefix: {BOT_MARKER}"#,
        number = pr.number,
        repo = pr.repository,
        url = pr.html_url(),
    )
}
