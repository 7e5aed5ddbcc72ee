use std::sync::Arc;

use crate::agent::ReviewAgent;
use crate::config::BotConfig;

/// Everything the event handlers need. Built once at startup and shared by all requests.
pub struct BotContext {
    pub agent: Arc<dyn ReviewAgent>,
    pub config: BotConfig,
}

impl BotContext {
    pub fn new(agent: Arc<dyn ReviewAgent>, config: BotConfig) -> Self {
        Self { agent, config }
    }

    pub fn bot_name(&self) -> &str {
        &self.config.bot_name
    }
}
