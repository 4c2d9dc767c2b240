//! In-memory sources for exercising the report and poll flow without HTTP.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{
    Comment, CommentThread, CommentType, Commit, PullRequest, PullRequestStatus, ThreadStatus,
};
use super::{CommitSource, PullRequestSource, ThreadSource};
use crate::error::PulseError;

#[derive(Default)]
pub struct FakeDevOps {
    pub pull_requests: Vec<PullRequest>,
    pub threads: HashMap<i64, Vec<CommentThread>>,
    pub commits: HashMap<i64, Vec<Commit>>,
    pub failing_threads: HashSet<i64>,
    pub failing_commits: HashSet<i64>,
}

#[async_trait]
impl PullRequestSource for FakeDevOps {
    async fn pull_requests(
        &self,
        status: Option<PullRequestStatus>,
    ) -> Result<Vec<PullRequest>, PulseError> {
        Ok(self
            .pull_requests
            .iter()
            .filter(|pr| status.map_or(true, |s| pr.status == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ThreadSource for FakeDevOps {
    async fn threads(&self, pull_request_id: i64) -> Result<Vec<CommentThread>, PulseError> {
        if self.failing_threads.contains(&pull_request_id) {
            return Err(PulseError::upstream("HTTP 500").for_pull_request(pull_request_id));
        }
        Ok(self.threads.get(&pull_request_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CommitSource for FakeDevOps {
    async fn commits(&self, pull_request_id: i64) -> Result<Vec<Commit>, PulseError> {
        if self.failing_commits.contains(&pull_request_id) {
            return Err(PulseError::upstream("HTTP 500").for_pull_request(pull_request_id));
        }
        Ok(self.commits.get(&pull_request_id).cloned().unwrap_or_default())
    }
}

pub fn pull_request(id: i64, author: &str, created_at: DateTime<Utc>) -> PullRequest {
    PullRequest {
        id,
        title: format!("PR #{}", id),
        description: Some(format!("Description of #{}", id)),
        created_at,
        closed_at: None,
        author: author.to_string(),
        status: PullRequestStatus::Active,
        repository: Some("cactus-ui".to_string()),
    }
}

pub fn active_thread(id: i64, text: &str, last_updated: DateTime<Utc>) -> CommentThread {
    CommentThread {
        id,
        status: ThreadStatus::Active,
        last_updated,
        comments: vec![Comment {
            comment_type: CommentType::Text,
            content: Some(text.to_string()),
        }],
    }
}

pub fn commit(id: &str, committed_at: DateTime<Utc>) -> Commit {
    Commit {
        id: id.to_string(),
        committed_at,
    }
}
