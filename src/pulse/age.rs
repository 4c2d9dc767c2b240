use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::devops::PullRequest;
use crate::error::PulseError;

/// Default age below which the newest pull request counts as new
pub const DEFAULT_NEW_PR_THRESHOLD_MINUTES: i64 = 10;

/// Snapshot of a pull request as seen by one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSummary {
    pub id: i64,
    /// Milliseconds since creation, never negative
    #[serde(rename = "age")]
    pub age_ms: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub author: String,
}

impl PullRequestSummary {
    pub fn from_pull_request(pr: &PullRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: pr.id,
            age_ms: pr.age_at(now).num_milliseconds(),
            title: pr.title.clone(),
            description: pr.description.clone(),
            author: pr.author.clone(),
        }
    }
}

/// Summaries sorted youngest first. The sort is stable, so pull requests of
/// equal age keep their input order.
pub fn classify(pull_requests: &[PullRequest], now: DateTime<Utc>) -> Vec<PullRequestSummary> {
    let mut summaries: Vec<_> = pull_requests
        .iter()
        .map(|pr| PullRequestSummary::from_pull_request(pr, now))
        .collect();
    summaries.sort_by_key(|s| s.age_ms);
    summaries
}

/// True when the youngest summary is strictly younger than `threshold`.
/// Callers check for an empty list first; asking about one is a contract error.
pub fn is_new(summaries: &[PullRequestSummary], threshold: Duration) -> Result<bool, PulseError> {
    let youngest = summaries
        .iter()
        .map(|s| s.age_ms)
        .min()
        .ok_or(PulseError::NoPullRequests)?;
    Ok(youngest < threshold.num_milliseconds())
}
