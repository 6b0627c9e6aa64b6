//! GitHub REST client for the pull request workflow

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::core::{Error, Result};
use crate::generation::traits::{CodeHostClient, CodeHostConnector, NewPullRequest, PullRequest};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

#[derive(Serialize)]
struct CreatePullRequestBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
    maintainer_can_modify: bool,
}

#[derive(Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

#[derive(Serialize)]
struct ReviewersBody<'a> {
    reviewers: &'a [&'a str],
}

#[derive(Serialize)]
struct LabelsBody<'a> {
    labels: &'a [&'a str],
}

/// Builds authenticated clients for individual repositories
#[derive(Debug, Clone)]
pub struct GitHubConnector {
    api_url: String,
    http: reqwest::Client,
}

impl GitHubConnector {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::config(format!("invalid GitHub token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

impl CodeHostConnector for GitHubConnector {
    fn connect(&self, owner: &str, repository: &str) -> Arc<dyn CodeHostClient> {
        Arc::new(GitHubClient {
            http: self.http.clone(),
            repo_url: format!("{}/repos/{owner}/{repository}", self.api_url),
            full_name: format!("{owner}/{repository}"),
        })
    }
}

/// Client bound to one repository
pub struct GitHubClient {
    http: reqwest::Client,
    repo_url: String,
    full_name: String,
}

impl GitHubClient {
    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(format!("{}/{path}", self.repo_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::CodeHost {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CodeHostClient for GitHubClient {
    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        info!("Creating pull request for {}", self.full_name);
        let body = CreatePullRequestBody {
            title: &request.title,
            head: &request.head,
            base: &request.base,
            body: &request.body,
            maintainer_can_modify: request.maintainer_can_modify,
        };
        let created: PullRequestResponse = self.post("pulls", &body).await?.json().await?;
        info!("Pull Request created at {}", created.html_url);
        Ok(PullRequest {
            number: created.number,
            html_url: created.html_url,
        })
    }

    async fn request_reviewers(&self, reviewers: &[&str], number: u64) -> Result<()> {
        info!(
            "Requesting reviewers ({}) for {}-PR-{number}",
            reviewers.join(", "),
            self.full_name
        );
        self.post(
            &format!("pulls/{number}/requested_reviewers"),
            &ReviewersBody { reviewers },
        )
        .await?;
        Ok(())
    }

    async fn add_labels(&self, labels: &[&str], number: u64) -> Result<()> {
        info!(
            "Adding labels ({}) for {}-PR-{number}",
            labels.join(", "),
            self.full_name
        );
        self.post(&format!("issues/{number}/labels"), &LabelsBody { labels })
            .await?;
        Ok(())
    }
}
