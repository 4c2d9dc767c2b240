//! Response shapes of the Azure DevOps Git REST API (v5.1) and their
//! conversion into the crate's types.

use serde::Deserialize;

use super::types::{
    parse_timestamp, Comment, CommentThread, CommentType, Commit, PullRequest, PullRequestStatus,
    ThreadStatus,
};
use crate::error::PulseError;

/// Every list endpoint wraps its items as `{ "count": n, "value": [...] }`
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryRef {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequest {
    pub pull_request_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    pub closed_date: Option<String>,
    pub created_by: Option<IdentityRef>,
    pub status: Option<PullRequestStatus>,
    pub repository: Option<RepositoryRef>,
}

impl TryFrom<GitPullRequest> for PullRequest {
    type Error = PulseError;

    fn try_from(raw: GitPullRequest) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(raw.creation_date.as_deref().unwrap_or(""))?;
        let closed_at = raw.closed_date.as_deref().map(parse_timestamp).transpose()?;

        Ok(PullRequest {
            id: raw.pull_request_id,
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            created_at,
            closed_at,
            author: raw
                .created_by
                .and_then(|identity| identity.display_name)
                .unwrap_or_default(),
            status: raw.status.unwrap_or(PullRequestStatus::Unknown),
            repository: raw.repository.and_then(|repo| repo.name),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitComment {
    pub comment_type: Option<CommentType>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequestCommentThread {
    pub id: i64,
    pub status: Option<ThreadStatus>,
    pub last_updated_date: Option<String>,
    #[serde(default)]
    pub comments: Vec<GitComment>,
}

impl TryFrom<GitPullRequestCommentThread> for CommentThread {
    type Error = PulseError;

    fn try_from(raw: GitPullRequestCommentThread) -> Result<Self, Self::Error> {
        let last_updated = parse_timestamp(raw.last_updated_date.as_deref().unwrap_or(""))?;

        Ok(CommentThread {
            id: raw.id,
            status: raw.status.unwrap_or(ThreadStatus::Unknown),
            last_updated,
            comments: raw
                .comments
                .into_iter()
                .map(|c| Comment {
                    comment_type: c.comment_type.unwrap_or(CommentType::Unknown),
                    content: c.content,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GitUserDate {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    pub commit_id: String,
    pub committer: Option<GitUserDate>,
}

impl TryFrom<GitCommitRef> for Commit {
    type Error = PulseError;

    fn try_from(raw: GitCommitRef) -> Result<Self, Self::Error> {
        let date = raw.committer.and_then(|c| c.date).unwrap_or_default();
        Ok(Commit {
            id: raw.commit_id,
            committed_at: parse_timestamp(&date)?,
        })
    }
}

/// Convert raw records, dropping (and logging) any whose timestamps are
/// malformed. One bad record never sinks the rest of the batch.
pub fn convert_records<R, T>(records: Vec<R>, kind: &str) -> Vec<T>
where
    T: TryFrom<R, Error = PulseError>,
{
    records
        .into_iter()
        .filter_map(|raw| match T::try_from(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, error = %e, "skipping record");
                None
            }
        })
        .collect()
}
