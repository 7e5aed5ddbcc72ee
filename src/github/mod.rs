//! Contains definitions of common types (pull request address, repository name, commit) needed
//! for working with (GitHub) repositories.
use std::fmt::{Display, Formatter};

use url::Url;

pub mod api;
mod error;
pub mod server;
mod webhook;

pub use error::WebhookRejection;
pub use webhook::{GitHubWebhook, WebhookSecret};

/// Unique identifier of a GitHub repository
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct GithubRepoName {
    owner: String,
    name: String,
}

impl GithubRepoName {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for GithubRepoName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.owner, self.name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitSha(pub String);

impl From<String> for CommitSha {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl AsRef<str> for CommitSha {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl Display for CommitSha {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PullRequestNumber(pub u64);

impl From<u64> for PullRequestNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for PullRequestNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <u64 as Display>::fmt(&self.0, f)
    }
}

/// A fully qualified pull request: the repository it lives in and its number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrAddress {
    pub repository: GithubRepoName,
    pub number: PullRequestNumber,
}

impl PrAddress {
    pub fn new(repository: GithubRepoName, number: PullRequestNumber) -> Self {
        Self { repository, number }
    }

    /// Parses a pull request URL of the form `github.com/{owner}/{repo}/pull/{number}`.
    ///
    /// The scheme may be omitted. Trailing segments after the number (e.g. `/files`) are
    /// accepted, anything else fails without producing a partial address.
    pub fn parse_url(pr_url: &str) -> Result<Self, PrUrlError> {
        let trimmed = pr_url.trim();
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        let url = Url::parse(&with_scheme).map_err(|_| PrUrlError(pr_url.to_string()))?;

        let host = url.host_str().unwrap_or_default();
        if host != "github.com" && host != "www.github.com" {
            return Err(PrUrlError(pr_url.to_string()));
        }

        let mut segments = url.path_segments().ok_or_else(|| PrUrlError(pr_url.to_string()))?;
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(owner), Some(repo), Some("pull"), Some(number))
                if !owner.is_empty() && !repo.is_empty() =>
            {
                let number = number
                    .parse::<u64>()
                    .ok()
                    .filter(|number| *number > 0)
                    .ok_or_else(|| PrUrlError(pr_url.to_string()))?;
                Ok(Self::new(GithubRepoName::new(owner, repo), number.into()))
            }
            _ => Err(PrUrlError(pr_url.to_string())),
        }
    }

    pub fn html_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.repository.owner(),
            self.repository.name(),
            self.number
        )
    }
}

impl Display for PrAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repository, self.number)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid GitHub PR URL format: `{0}`")]
pub struct PrUrlError(pub String);
