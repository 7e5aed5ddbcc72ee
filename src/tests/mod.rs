use std::sync::{Arc, Mutex};

use axum::async_trait;
use serde_json::{json, Value};

use crate::agent::{AgentRequest, ReviewAgent};
use crate::bot::event::BotEvent;
use crate::bot::{handle_bot_event, BotContext};
use crate::config::BotConfig;

mod io;
mod mocks;

// Public re-exports for use in tests
pub use event::{comment_event, default_pr, pr_updated_event, review_comment_event};
pub use io::load_test_file;
pub use mocks::{AgentMockServer, GitHubMockServer};
pub use tester::BotTester;
pub use webhook::{create_webhook_request, unsigned_webhook_request, TEST_WEBHOOK_SECRET};

/// Agent which remembers the instructions it received instead of executing them.
#[derive(Clone, Default)]
pub struct TestAgent {
    requests: Arc<Mutex<Vec<AgentRequest>>>,
    fail: bool,
}

impl TestAgent {
    /// Creates an agent whose every run ends with an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn context(&self) -> BotContext {
        BotContext::new(Arc::new(self.clone()), BotConfig::default())
    }

    pub async fn handle(&self, event: BotEvent) -> bool {
        handle_bot_event(event, &self.context()).await
    }
}

#[async_trait]
impl ReviewAgent for TestAgent {
    async fn run(&self, request: AgentRequest) -> anyhow::Result<Value> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(anyhow::anyhow!("Agent has failed"));
        }
        Ok(json!({}))
    }
}
