use anyhow::Error;
use tracing::span::Span;

pub trait LogError {
    /// Logs `error` as the reason why `operation` did not finish.
    fn log_error(&self, operation: &str, error: &Error);
}

impl LogError for Span {
    fn log_error(&self, operation: &str, error: &Error) {
        self.in_scope(|| {
            tracing::error!("{operation} failed: {error:?}");
        });
    }
}
