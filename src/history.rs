use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::deadline::with_deadline;
use crate::devops::{PullRequest, PullRequestSource, PullRequestStatus};
use crate::error::PulseError;

/// How long a completed pull request stayed open
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpanSummary {
    pub id: i64,
    pub creation_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    /// Pull request title
    pub description: String,
}

impl TimeSpanSummary {
    pub fn open_duration(&self) -> Option<chrono::Duration> {
        self.completed_date.map(|done| done - self.creation_date)
    }
}

impl From<&PullRequest> for TimeSpanSummary {
    fn from(pr: &PullRequest) -> Self {
        Self {
            id: pr.id,
            creation_date: pr.created_at,
            completed_date: pr.closed_at,
            description: pr.title.clone(),
        }
    }
}

/// Fetch completed pull requests, newest first
pub async fn completed_time_spans<S: PullRequestSource>(
    source: &S,
    fetch_timeout: Duration,
) -> Result<Vec<TimeSpanSummary>, PulseError> {
    let prs = with_deadline(
        "pull request fetch",
        fetch_timeout,
        source.pull_requests(Some(PullRequestStatus::Completed)),
    )
    .await?;

    let mut summaries: Vec<TimeSpanSummary> = prs.iter().map(TimeSpanSummary::from).collect();
    summaries.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
    Ok(summaries)
}
