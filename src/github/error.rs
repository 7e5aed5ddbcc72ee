use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Reasons why an incoming webhook request could not be processed.
///
/// Internal details are only logged, the response bodies are fixed.
#[derive(thiserror::Error, Debug)]
pub enum WebhookRejection {
    #[error("Missing X-GitHub-Event header")]
    MissingEventHeader,
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Cannot process webhook: {0:?}")]
    MalformedPayload(anyhow::Error),
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        match self {
            WebhookRejection::MissingEventHeader => {
                tracing::warn!("Webhook request without X-GitHub-Event header");
                error_response(StatusCode::BAD_REQUEST, "Missing X-GitHub-Event header")
            }
            WebhookRejection::InvalidSignature => {
                tracing::error!("Webhook request failed, could not authenticate webhook");
                error_response(StatusCode::UNAUTHORIZED, "Invalid webhook signature")
            }
            WebhookRejection::MalformedPayload(error) => {
                tracing::error!("Error processing webhook: {error:?}");
                internal_error()
            }
        }
    }
}

pub(crate) fn internal_error() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
