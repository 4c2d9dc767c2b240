use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use super::types::{CommentThread, Commit, PullRequest, PullRequestStatus};
use super::wire::{
    convert_records, GitCommitRef, GitPullRequest, GitPullRequestCommentThread, ListResponse,
};
use super::{CommitSource, PullRequestSource, ThreadSource};
use crate::error::PulseError;

const API_VERSION: &str = "5.1";

/// Pull requests are fetched as a single page of at most this many entries.
/// Repositories with more open pull requests are silently cut at this size.
pub const PAGE_SIZE: u32 = 500;

/// Where the repository lives: organisation URL, project, repository id
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryLocator {
    pub org_url: Url,
    pub project: String,
    pub repository_id: String,
}

impl RepositoryLocator {
    /// `{org}/{project}/_apis/git/repositories/{repo}/` followed by `segments`
    fn api_url(&self, segments: &[&str]) -> Result<Url, PulseError> {
        let mut url = self.org_url.clone();
        url.path_segments_mut()
            .map_err(|_| PulseError::Configuration {
                message: format!("organisation URL cannot be a base: {}", self.org_url),
            })?
            .pop_if_empty()
            .extend([self.project.as_str(), "_apis", "git", "repositories"])
            .push(&self.repository_id)
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    /// Browser link to a pull request
    pub fn web_url(&self, repository_name: Option<&str>, pull_request_id: i64) -> String {
        let base = self.org_url.as_str().trim_end_matches('/');
        format!(
            "{}/{}/_git/{}/pullrequest/{}",
            base,
            self.project,
            repository_name.unwrap_or(&self.repository_id),
            pull_request_id
        )
    }
}

/// Authenticated client for the Azure DevOps Git REST API
#[derive(Clone)]
pub struct AzureDevOpsClient {
    http: reqwest::Client,
    locator: RepositoryLocator,
    token: String,
}

/// Create an authenticated Azure DevOps client using a personal access token
pub fn create_client(
    token: &str,
    locator: RepositoryLocator,
) -> Result<AzureDevOpsClient, PulseError> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("pr-pulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PulseError::upstream(format!("failed to build HTTP client: {}", e)))?;

    Ok(AzureDevOpsClient {
        http,
        locator,
        token: token.to_string(),
    })
}

impl AzureDevOpsClient {
    pub fn locator(&self) -> &RepositoryLocator {
        &self.locator
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, PulseError> {
        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PulseError::upstream(format!("network error: {}", e)))?;

        let status = response.status();
        // A rejected PAT yields 203 with the HTML sign-in page instead of a 401
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NON_AUTHORITATIVE_INFORMATION
        {
            return Err(PulseError::Authentication {
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::upstream(format!(
                "Azure DevOps API error: HTTP {} {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let list: ListResponse<T> = response
            .json()
            .await
            .map_err(|e| PulseError::upstream(format!("failed to parse response: {}", e)))?;
        Ok(list.value)
    }
}

#[async_trait]
impl PullRequestSource for AzureDevOpsClient {
    async fn pull_requests(
        &self,
        status: Option<PullRequestStatus>,
    ) -> Result<Vec<PullRequest>, PulseError> {
        let mut url = self.locator.api_url(&["pullrequests"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("$top", &PAGE_SIZE.to_string());
            if let Some(status) = status {
                query.append_pair("searchCriteria.status", status.as_query());
            }
        }

        let raw: Vec<GitPullRequest> = self.get_list(url).await?;
        Ok(convert_records(raw, "pull request"))
    }
}

#[async_trait]
impl ThreadSource for AzureDevOpsClient {
    async fn threads(&self, pull_request_id: i64) -> Result<Vec<CommentThread>, PulseError> {
        let id = pull_request_id.to_string();
        let url = self.locator.api_url(&["pullrequests", &id, "threads"])?;
        let raw: Vec<GitPullRequestCommentThread> = self
            .get_list(url)
            .await
            .map_err(|e| e.for_pull_request(pull_request_id))?;
        Ok(convert_records(raw, "comment thread"))
    }
}

#[async_trait]
impl CommitSource for AzureDevOpsClient {
    async fn commits(&self, pull_request_id: i64) -> Result<Vec<Commit>, PulseError> {
        let id = pull_request_id.to_string();
        let url = self.locator.api_url(&["pullRequests", &id, "commits"])?;
        let raw: Vec<GitCommitRef> = self
            .get_list(url)
            .await
            .map_err(|e| e.for_pull_request(pull_request_id))?;
        Ok(convert_records(raw, "commit"))
    }
}
