//! GitHub REST client for pull requests

use crate::{ApiFailure, ApiResult, Error, Result};
use prflow_core::{RepoSlug, Settings};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Payload for opening a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Branch with the changes
    pub head: String,
    /// Branch to merge into
    pub base: String,
}

/// The parts of a created pull request we use
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedPullRequest {
    /// PR number
    pub number: u64,
    /// Browser URL of the PR
    pub html_url: String,
}

#[derive(Serialize)]
struct ReviewersRequest<'a> {
    reviewers: &'a [String],
}

/// GitHub API client for one repository
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    repo: RepoSlug,
}

impl GitHubClient {
    /// Create a client for `repo`, authenticating with `token`
    ///
    /// Requests carry `Authorization: token <token>`.
    pub fn new(api_url: impl Into<String>, token: &str, repo: RepoSlug) -> Result<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();

        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| Error::Auth("Token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("prflow/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        info!(repo = %repo, api = %api_url, "Created GitHub client");

        Ok(Self {
            http,
            api_url,
            repo,
        })
    }

    /// Create a client from resolved settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api_url, &settings.token, settings.repo.clone())
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repo.repo
    }

    /// Endpoint for creating pull requests
    pub fn pulls_url(&self) -> String {
        format!("{}/repos/{}/{}/pulls", self.api_url, self.owner(), self.repo())
    }

    /// Endpoint for requesting reviewers on pull request `number`
    pub fn requested_reviewers_url(&self, number: u64) -> String {
        format!("{}/{}/requested_reviewers", self.pulls_url(), number)
    }

    /// Open a pull request
    pub async fn create_pull_request(&self, pr: &NewPullRequest) -> ApiResult<CreatedPullRequest> {
        debug!(head = %pr.head, base = %pr.base, "Creating pull request");

        let body = self.post_expecting_created(&self.pulls_url(), pr).await?;

        let created: CreatedPullRequest =
            serde_json::from_str(&body).map_err(|e| ApiFailure::Parse(e.to_string()))?;

        info!(number = created.number, url = %created.html_url, "Pull request created");
        Ok(created)
    }

    /// Request reviews on an existing pull request
    pub async fn request_reviewers(&self, number: u64, reviewers: &[String]) -> ApiResult<()> {
        debug!(number, ?reviewers, "Requesting reviewers");

        self.post_expecting_created(
            &self.requested_reviewers_url(number),
            &ReviewersRequest { reviewers },
        )
        .await?;

        info!(number, count = reviewers.len(), "Reviewers requested");
        Ok(())
    }

    async fn post_expecting_created<B: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &B,
    ) -> ApiResult<String> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        if status != StatusCode::CREATED {
            warn!(url, status = status.as_u16(), %body, "GitHub API call rejected");
            return Err(ApiFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(api_url: &str) -> GitHubClient {
        GitHubClient::new(api_url, "t0ken", RepoSlug::parse("octo/site").unwrap()).unwrap()
    }

    fn new_pr() -> NewPullRequest {
        NewPullRequest {
            title: "T".to_string(),
            body: "B".to_string(),
            head: "feature-x".to_string(),
            base: "master".to_string(),
        }
    }

    #[test]
    fn test_urls() {
        let client = client("https://api.github.com/");
        assert_eq!(
            client.pulls_url(),
            "https://api.github.com/repos/octo/site/pulls"
        );
        assert_eq!(
            client.requested_reviewers_url(42),
            "https://api.github.com/repos/octo/site/pulls/42/requested_reviewers"
        );
    }

    #[test]
    fn test_payload_shape() {
        assert_eq!(
            serde_json::to_value(new_pr()).unwrap(),
            json!({"title": "T", "body": "B", "head": "feature-x", "base": "master"})
        );
    }

    #[test]
    fn test_invalid_token() {
        let result = GitHubClient::new(
            "https://api.github.com",
            "bad\ntoken",
            RepoSlug::parse("octo/site").unwrap(),
        );
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_create_pull_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/site/pulls"))
            .and(header("authorization", "token t0ken"))
            .and(body_json(
                json!({"title": "T", "body": "B", "head": "feature-x", "base": "master"}),
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "number": 42,
                "html_url": "http://x",
                "state": "open"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server.uri())
            .create_pull_request(&new_pr())
            .await
            .unwrap();

        assert_eq!(
            created,
            CreatedPullRequest {
                number: 42,
                html_url: "http://x".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_create_pull_request_requires_201() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/site/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 42,
                "html_url": "http://x"
            })))
            .mount(&server)
            .await;

        let failure = client(&server.uri())
            .create_pull_request(&new_pr())
            .await
            .unwrap_err();

        assert!(matches!(failure, ApiFailure::Status { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_create_pull_request_keeps_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/site/pulls"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string("{\"message\":\"Validation Failed\"}"),
            )
            .mount(&server)
            .await;

        let failure = client(&server.uri())
            .create_pull_request(&new_pr())
            .await
            .unwrap_err();

        assert_eq!(
            failure,
            ApiFailure::Status {
                status: 422,
                body: "{\"message\":\"Validation Failed\"}".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_create_pull_request_bad_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/site/pulls"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let failure = client(&server.uri())
            .create_pull_request(&new_pr())
            .await
            .unwrap_err();

        assert!(matches!(failure, ApiFailure::Parse(_)));
    }

    #[tokio::test]
    async fn test_request_reviewers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/site/pulls/42/requested_reviewers"))
            .and(header("authorization", "token t0ken"))
            .and(body_json(json!({"reviewers": ["alice", "bob"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let reviewers = vec!["alice".to_string(), "bob".to_string()];
        client(&server.uri())
            .request_reviewers(42, &reviewers)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on the discard port
        let failure = client("http://127.0.0.1:9")
            .create_pull_request(&new_pr())
            .await
            .unwrap_err();

        assert!(matches!(failure, ApiFailure::Transport(_)));
    }
}
