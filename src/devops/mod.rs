//! Azure DevOps access: the data the rest of the crate consumes, and the
//! narrow source traits the stale-thread report and poll flow are written
//! against.

pub mod client;
pub mod types;
pub mod wire;

#[cfg(test)]
pub(crate) mod fakes;

pub use client::{create_client, AzureDevOpsClient, RepositoryLocator, PAGE_SIZE};
pub use types::{
    parse_timestamp, Comment, CommentThread, CommentType, Commit, PullRequest, PullRequestStatus,
    ThreadStatus,
};

use async_trait::async_trait;

use crate::error::PulseError;

/// Lists pull requests of the configured repository.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// `None` asks for the service default (open pull requests).
    async fn pull_requests(
        &self,
        status: Option<PullRequestStatus>,
    ) -> Result<Vec<PullRequest>, PulseError>;
}

/// Lists review comment threads of one pull request.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    async fn threads(&self, pull_request_id: i64) -> Result<Vec<CommentThread>, PulseError>;
}

/// Lists commits of one pull request.
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn commits(&self, pull_request_id: i64) -> Result<Vec<Commit>, PulseError>;
}
