use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// Parse an upstream date (RFC 3339, as Azure DevOps returns them).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PulseError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PulseError::InvalidTimestamp {
            value: value.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PullRequestStatus {
    NotSet,
    Active,
    Abandoned,
    Completed,
    #[serde(other)]
    Unknown,
}

impl PullRequestStatus {
    /// Value accepted by the `searchCriteria.status` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            PullRequestStatus::NotSet => "notSet",
            PullRequestStatus::Active => "active",
            PullRequestStatus::Abandoned => "abandoned",
            PullRequestStatus::Completed => "completed",
            PullRequestStatus::Unknown => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author: String,
    pub status: PullRequestStatus,
    pub repository: Option<String>, // repository name, when the service reports it
}

impl PullRequest {
    /// Time since creation as of `now`, never negative
    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.created_at).max(chrono::Duration::zero())
    }

    /// How long the PR stayed open, if it has been closed
    pub fn open_duration(&self) -> Option<chrono::Duration> {
        self.closed_at.map(|closed| closed - self.created_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThreadStatus {
    Active,
    Fixed,
    WontFix,
    Closed,
    ByDesign,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentType {
    Text,
    CodeChange,
    System,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub comment_type: CommentType,
    pub content: Option<String>,
}

impl Comment {
    fn is_text_with_content(&self) -> bool {
        self.comment_type == CommentType::Text
            && self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub id: i64,
    pub status: ThreadStatus,
    pub last_updated: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

impl CommentThread {
    /// An active thread is unresolved and carries at least one non-empty text comment
    pub fn is_active(&self) -> bool {
        self.status == ThreadStatus::Active
            && self.comments.iter().any(Comment::is_text_with_content)
    }

    /// Text shown for the thread in reports: the first comment when it has
    /// content, otherwise the first non-empty text comment
    pub fn headline(&self) -> &str {
        self.comments
            .first()
            .and_then(|c| c.content.as_deref())
            .filter(|c| !c.trim().is_empty())
            .or_else(|| {
                self.comments
                    .iter()
                    .find(|c| c.is_text_with_content())
                    .and_then(|c| c.content.as_deref())
            })
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub id: String,
    pub committed_at: DateTime<Utc>,
}
