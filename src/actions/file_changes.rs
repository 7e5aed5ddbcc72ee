use futures::StreamExt;

use crate::actions::ActionError;
use crate::github::api::{ChangedFile, GithubClient, PullRequestRefs};
use crate::github::{CommitSha, PrAddress};

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetFileBeforeAfterParams {
    pub pr_url: String,
}

/// Content of a single changed file before and after the pull request.
#[derive(serde::Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FileChange {
    pub filename: String,
    /// `None` if the file was added, or if it could not be loaded.
    pub before_content: Option<String>,
    /// `None` if the file was removed, or if it could not be loaded.
    pub after_content: Option<String>,
}

/// Loads the base and head versions of every file changed in the PR.
///
/// At most `concurrency` files are fetched at once. A file whose content cannot be loaded
/// does not fail the whole action, its content is reported as missing instead.
/// The result is in the order in which GitHub lists the files.
pub async fn get_file_before_after(
    github: &GithubClient,
    pr_url: &str,
    concurrency: usize,
) -> Result<Vec<FileChange>, ActionError> {
    let pr = PrAddress::parse_url(pr_url)?;

    let refs = github
        .get_pull_request_refs(&pr)
        .await
        .map_err(ActionError::api("fetch PR file contents"))?;
    let files = github
        .list_pull_request_files(&pr)
        .await
        .map_err(ActionError::api("fetch PR file contents"))?;

    tracing::debug!("Fetching content of {} file(s) of {pr}", files.len());

    let pr = &pr;
    let refs = &refs;
    let changes = futures::stream::iter(
        files
            .into_iter()
            .map(|file| load_file_change(github, pr, refs, file)),
    )
    .buffered(concurrency.max(1))
    .collect()
    .await;
    Ok(changes)
}

async fn load_file_change(
    github: &GithubClient,
    pr: &PrAddress,
    refs: &PullRequestRefs,
    file: ChangedFile,
) -> FileChange {
    let (after_content, before_content) = tokio::join!(
        async {
            if file.status.exists_after() {
                load_content(github, pr, &file.filename, &refs.head).await
            } else {
                None
            }
        },
        async {
            if file.status.exists_before() {
                load_content(github, pr, file.base_filename(), &refs.base).await
            } else {
                None
            }
        }
    );

    FileChange {
        filename: file.filename,
        before_content,
        after_content,
    }
}

async fn load_content(
    github: &GithubClient,
    pr: &PrAddress,
    filename: &str,
    sha: &CommitSha,
) -> Option<String> {
    match github.get_file_content(pr, filename, sha).await {
        Ok(content) => content,
        Err(error) => {
            tracing::error!("Error fetching content of {filename} at {sha}: {error:?}");
            None
        }
    }
}
