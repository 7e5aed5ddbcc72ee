use std::time::Duration;

/// Name used in `@mentions` when no bot username is configured.
pub const DEFAULT_BOT_USERNAME: &str = "github-bot";

/// Runtime configuration of the bot, built once during startup.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// GitHub login of the bot, used to detect `@mentions` in comments.
    pub bot_name: String,
    /// Upper bound of concurrently fetched files in a single PR.
    pub file_fetch_concurrency: usize,
    pub github_retry: RetryPolicy,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_USERNAME.to_string(),
            file_fetch_concurrency: 8,
            github_retry: RetryPolicy::default(),
        }
    }
}

/// How many times (and how patiently) an idempotent remote call is retried.
///
/// The default performs no retries.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound of a single delay between two attempts, jitter included.
    pub max_delay: Duration,
}

/// Default upper bound of a single retry delay.
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }

    pub fn with_max_delay(self, max_delay: Duration) -> Self {
        Self { max_delay, ..self }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, Duration::from_millis(500))
    }
}
