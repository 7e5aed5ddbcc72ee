mod agent;
mod github;

pub use agent::AgentMockServer;
pub use github::GitHubMockServer;
