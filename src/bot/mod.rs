use std::borrow::Cow;

mod context;
pub mod event;
mod handlers;
mod trigger;

pub use context::BotContext;
pub use handlers::handle_bot_event;
pub use trigger::should_respond;

/// Prefix of every comment posted by the bot.
///
/// Comments starting with it are never answered, which keeps the bot from replying to itself.
pub const BOT_MARKER: &str = "🤖 ";

/// Cheap check on the raw comment body, done before any handler is invoked.
pub fn is_bot_comment(body: &str) -> bool {
    body.starts_with(BOT_MARKER)
}

/// Makes sure that `text` starts with [`BOT_MARKER`].
pub fn with_bot_marker(text: &str) -> Cow<'_, str> {
    if text.trim_start().starts_with(BOT_MARKER) {
        text.into()
    } else {
        format!("{BOT_MARKER}{}", text.trim_start()).into()
    }
}
