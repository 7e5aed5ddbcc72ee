use base64::Engine;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::config::RetryPolicy;
use crate::github::api::{create_github_client, GithubClient};
use crate::github::{GithubRepoName, PrAddress};

pub const HEAD_SHA: &str = "head-sha";
pub const BASE_SHA: &str = "base-sha";

/// Simulated GitHub REST API.
pub struct GitHubMockServer {
    mock_server: MockServer,
}

impl GitHubMockServer {
    pub async fn start() -> Self {
        Self {
            mock_server: MockServer::start().await,
        }
    }

    pub fn mock_server(&self) -> &MockServer {
        &self.mock_server
    }

    pub fn client(&self) -> GithubClient {
        self.client_with_retry(RetryPolicy::none())
    }

    pub fn client_with_retry(&self, retry: RetryPolicy) -> GithubClient {
        let client = create_github_client(
            &self.mock_server.uri(),
            &SecretString::new("test-token".to_string()),
        )
        .unwrap();
        GithubClient::new(client, retry)
    }

    /// Serves the PR with head [`HEAD_SHA`] and base [`BASE_SHA`].
    pub async fn mock_pull_request(&self, pr: &PrAddress) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/pulls/{}", pr.repository, pr.number)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": pr.number.0,
                "state": "open",
                "head": { "ref": "feature", "sha": HEAD_SHA },
                "base": { "ref": "main", "sha": BASE_SHA }
            })))
            .mount(&self.mock_server)
            .await;
    }

    /// Serves a single page with the given `(filename, status)` pairs.
    pub async fn mock_files(&self, pr: &PrAddress, files: &[(&str, &str)]) {
        let files: Vec<_> = files
            .iter()
            .map(|(filename, status)| json!({ "filename": filename, "status": status }))
            .collect();
        self.mock_files_page(pr, 1, files).await;
    }

    pub async fn mock_files_page(&self, pr: &PrAddress, page: u32, files: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/repos/{}/pulls/{}/files",
                pr.repository, pr.number
            )))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(files))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_content(&self, repo: &GithubRepoName, file: &str, sha: &str, content: &str) {
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/contents/{file}")))
            .and(query_param("ref", sha))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "file",
                "path": file,
                "encoding": "base64",
                "content": encoded
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_content_error(&self, repo: &GithubRepoName, file: &str, sha: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repo}/contents/{file}")))
            .and(query_param("ref", sha))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "Server Error",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create_review(&self, pr: &PrAddress, review_id: u64) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/repos/{}/pulls/{}/reviews",
                pr.repository, pr.number
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": review_id,
                "state": "COMMENTED",
                "commit_id": HEAD_SHA
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create_comment(&self, pr: &PrAddress, comment_id: u64) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/repos/{}/issues/{}/comments",
                pr.repository, pr.number
            )))
            .respond_with(move |request: &Request| {
                let payload: serde_json::Value = request.body_json().unwrap();
                ResponseTemplate::new(201).set_body_json(json!({
                    "id": comment_id,
                    "body": payload["body"]
                }))
            })
            .mount(&self.mock_server)
            .await;
    }

    pub async fn received_requests(&self) -> Vec<Request> {
        self.mock_server.received_requests().await.unwrap_or_default()
    }

    /// Bodies of all requests sent to the given path with the given method.
    pub async fn request_bodies(&self, http_method: &str, url_path: &str) -> Vec<serde_json::Value> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|request| {
                request.method.as_str() == http_method && request.url.path() == url_path
            })
            .map(|request| request.body_json().unwrap())
            .collect()
    }
}
