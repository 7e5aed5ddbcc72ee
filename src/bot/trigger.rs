use crate::bot::BOT_MARKER;

/// Phrases which signal that the author of a comment would like the bot to chime in.
const TRIGGER_PHRASES: &[&str] = &[
    "bot",
    "ai",
    "review",
    "help",
    "explain",
    "what do you think",
    "can you suggest",
];

/// Decides whether the bot should answer a comment with the given body.
///
/// Comments authored by the bot itself are never answered. Otherwise the comment has to
/// mention the bot or contain one of the trigger phrases (case-insensitive substring match).
/// With an empty `bot_name`, any `@mention` counts as a mention of the bot.
pub fn should_respond(comment_body: &str, bot_name: &str) -> bool {
    if comment_body.trim_start().starts_with(BOT_MARKER) {
        return false;
    }

    let text = comment_body.to_lowercase();
    let mentioned = text.contains(&format!("@{}", bot_name.to_lowercase()));
    mentioned || TRIGGER_PHRASES.iter().any(|phrase| text.contains(phrase))
}
