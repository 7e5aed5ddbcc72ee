//! This is the library of the PR review bot.
//!
//! The bot receives GitHub webhooks about pull requests and their comments, decides whether it
//! should react, and hands a single instruction to a reasoning agent which performs the actual
//! GitHub actions.
pub mod actions;
pub mod agent;
pub mod bot;
pub mod config;
pub mod github;
pub mod utils;

pub use bot::{BotContext, BOT_MARKER};
pub use config::{BotConfig, RetryPolicy};
pub use github::server::{create_app, ServerState};
pub use github::WebhookSecret;

#[cfg(test)]
mod tests;
