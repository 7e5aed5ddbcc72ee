use anyhow::Context;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};

pub mod client;
pub(crate) mod operations;

pub use client::{ChangedFile, FileStatus, GithubClient, PullRequestRefs};
pub use operations::{InlineComment, ReviewId};

pub fn base_github_url() -> &'static str {
    "https://api.github.com"
}

/// Creates an octocrab client authenticated with a personal access (or installation) token.
///
/// `base_url` is configurable so that the bot can talk to GitHub Enterprise or to a mock server.
pub fn create_github_client(base_url: &str, token: &SecretString) -> anyhow::Result<Octocrab> {
    Octocrab::builder()
        .base_uri(base_url)
        .with_context(|| format!("Invalid GitHub API URL {base_url}"))?
        .personal_token(token.expose_secret().to_string())
        .build()
        .context("Could not create octocrab builder")
}
