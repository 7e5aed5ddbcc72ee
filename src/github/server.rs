use std::any::Any;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;

use crate::bot::{handle_bot_event, BotContext};
use crate::github::error::internal_error;
use crate::github::webhook::{GitHubWebhook, WebhookSecret};

/// Shared server state for all axum handlers.
pub struct ServerState {
    bot: BotContext,
    webhook_secret: Option<WebhookSecret>,
}

impl ServerState {
    pub fn new(bot: BotContext, webhook_secret: Option<WebhookSecret>) -> Self {
        Self {
            bot,
            webhook_secret,
        }
    }

    /// Webhooks are only authenticated if a secret was configured.
    pub fn get_webhook_secret(&self) -> Option<&WebhookSecret> {
        self.webhook_secret.as_ref()
    }
}

pub type ServerStateRef = Arc<ServerState>;

pub fn create_app(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/webhook", post(github_webhook_handler))
        .layer(ConcurrencyLimitLayer::new(100))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(Arc::new(state))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Router panicked: {err:?}");
    internal_error()
}

async fn index_handler() -> impl IntoResponse {
    "GitHub PR Review Bot is running"
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "")
}

/// Axum handler that receives a webhook and lets the bot react to it.
///
/// The webhook is acknowledged even if the bot fails to act on it; the outcome is only logged.
pub async fn github_webhook_handler(
    State(state): State<ServerStateRef>,
    GitHubWebhook(event): GitHubWebhook,
) -> impl IntoResponse {
    if let Some(event) = event {
        let pr = event.pr().to_string();
        let handled = handle_bot_event(event, &state.bot).await;
        tracing::debug!("Event on {pr} handled: {handled}");
    }
    (StatusCode::OK, Json(json!({ "status": "success" })))
}
