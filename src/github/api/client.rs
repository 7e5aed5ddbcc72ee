use anyhow::Context;
use base64::Engine;
use octocrab::Octocrab;
use url::Url;

use crate::config::RetryPolicy;
use crate::github::api::operations::{create_review, InlineComment, ReviewId};
use crate::github::{CommitSha, GithubRepoName, PrAddress};

const FILES_PER_PAGE: usize = 100;

/// Provides access to the GitHub REST API for the operations needed by the bot.
///
/// Read operations are retried according to the configured [`RetryPolicy`],
/// write operations are performed exactly once.
#[derive(Clone)]
pub struct GithubClient {
    client: Octocrab,
    retry: RetryPolicy,
}

/// Head and base commits of a pull request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestRefs {
    pub head: CommitSha,
    pub base: CommitSha,
}

/// A file touched by a pull request.
#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    /// Path of the file at the base commit, only present for renamed files.
    #[serde(default)]
    pub previous_filename: Option<String>,
}

impl ChangedFile {
    /// Path under which the file can be found at the base commit.
    pub fn base_filename(&self) -> &str {
        self.previous_filename.as_deref().unwrap_or(&self.filename)
    }
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl FileStatus {
    /// Does the file exist at the head commit of the PR?
    pub fn exists_after(&self) -> bool {
        !matches!(self, FileStatus::Removed)
    }

    /// Does the file exist at the base commit of the PR?
    pub fn exists_before(&self) -> bool {
        !matches!(self, FileStatus::Added)
    }
}

#[derive(serde::Serialize)]
struct PageQuery {
    per_page: usize,
    page: u32,
}

#[derive(serde::Serialize)]
struct ContentQuery<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
}

impl GithubClient {
    pub fn new(client: Octocrab, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Resolves the current head and base commits of the given PR.
    pub async fn get_pull_request_refs(&self, pr: &PrAddress) -> anyhow::Result<PullRequestRefs> {
        #[derive(serde::Deserialize)]
        struct Ref {
            sha: String,
        }

        #[derive(serde::Deserialize)]
        struct PullRequestPayload {
            head: Ref,
            base: Ref,
        }

        // https://docs.github.com/en/rest/pulls/pulls?apiVersion=2022-11-28#get-a-pull-request
        let route = format!("/repos/{}/pulls/{}", pr.repository, pr.number);
        let client = &self.client;
        let route = &route;
        let payload: PullRequestPayload = self
            .retry
            .retry("Loading PR", || async move {
                client
                    .get(route, None::<&()>)
                    .await
                    .with_context(|| format!("Could not get PR {pr}"))
            })
            .await?;

        Ok(PullRequestRefs {
            head: payload.head.sha.into(),
            base: payload.base.sha.into(),
        })
    }

    /// Lists all files changed in the given PR, following pagination.
    pub async fn list_pull_request_files(&self, pr: &PrAddress) -> anyhow::Result<Vec<ChangedFile>> {
        // https://docs.github.com/en/rest/pulls/pulls?apiVersion=2022-11-28#list-pull-requests-files
        let route = format!("/repos/{}/pulls/{}/files", pr.repository, pr.number);
        let client = &self.client;
        let route = &route;

        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let query = PageQuery {
                per_page: FILES_PER_PAGE,
                page,
            };
            let query = &query;
            let batch: Vec<ChangedFile> = self
                .retry
                .retry("Listing PR files", || async move {
                    client
                        .get(route, Some(query))
                        .await
                        .with_context(|| format!("Could not list files of PR {pr} (page {page})"))
                })
                .await?;

            let batch_len = batch.len();
            files.extend(batch);
            if batch_len < FILES_PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(files)
    }

    /// Downloads the content of `path` at the commit `sha`.
    ///
    /// Returns `None` if GitHub does not provide inline content for the file
    /// (e.g. when it is too large).
    pub async fn get_file_content(
        &self,
        pr: &PrAddress,
        path: &str,
        sha: &CommitSha,
    ) -> anyhow::Result<Option<String>> {
        #[derive(serde::Deserialize)]
        struct ContentPayload {
            content: Option<String>,
            encoding: Option<String>,
        }

        // https://docs.github.com/en/rest/repos/contents?apiVersion=2022-11-28#get-repository-content
        let route = content_route(&pr.repository, path)?;
        let query = ContentQuery {
            git_ref: sha.as_ref(),
        };
        let client = &self.client;
        let route = &route;
        let query = &query;
        let payload: ContentPayload = self
            .retry
            .retry("Loading file content", || async move {
                client
                    .get(route, Some(query))
                    .await
                    .with_context(|| format!("Could not load `{path}` at {sha}"))
            })
            .await?;

        match (payload.encoding.as_deref(), payload.content) {
            (Some("base64"), Some(content)) => decode_content(&content)
                .with_context(|| format!("Could not decode `{path}` at {sha}"))
                .map(Some),
            _ => Ok(None),
        }
    }

    /// Creates a single review on the PR containing all `comments`.
    pub async fn create_review(
        &self,
        pr: &PrAddress,
        commit: &CommitSha,
        comments: &[InlineComment<'_>],
    ) -> anyhow::Result<ReviewId> {
        create_review(self, pr, commit, comments).await
    }

    /// The comment will be posted as the user that owns the token.
    pub async fn post_comment(&self, pr: &PrAddress, text: &str) -> anyhow::Result<u64> {
        #[derive(serde::Deserialize)]
        struct CreatedComment {
            id: u64,
        }

        // https://docs.github.com/en/rest/issues/comments?apiVersion=2022-11-28#create-an-issue-comment
        let route = format!("/repos/{}/issues/{}/comments", pr.repository, pr.number);
        let comment: CreatedComment = self
            .client
            .post(route, Some(&serde_json::json!({ "body": text })))
            .await
            .with_context(|| format!("Cannot post comment to {pr}"))?;
        Ok(comment.id)
    }
}

/// Route of the contents endpoint for `path`, with every path segment percent-encoded.
fn content_route(repository: &GithubRepoName, path: &str) -> anyhow::Result<String> {
    let mut url = Url::parse("https://api.github.com")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Cannot build content route for `{path}`"))?
        .clear()
        .extend(["repos", repository.owner(), repository.name(), "contents"])
        .extend(path.trim_start_matches('/').split('/'));
    Ok(url.path().to_string())
}

/// GitHub wraps base64 content into 60 character lines.
fn decode_content(content: &str) -> anyhow::Result<String> {
    let stripped: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(stripped)?;
    String::from_utf8(bytes).context("File is not valid UTF-8")
}
