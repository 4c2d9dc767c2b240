use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::credentials::{token_from, ENV_TOKEN_VAR};
use crate::deadline::with_deadline;
use crate::devops::{create_client, PullRequestSource};
use crate::error::PulseError;
use crate::notify::{publish_pulse, HttpNotificationSink, NotificationSink};
use crate::pulse::{classify, select_for_newest, PullRequestSummary};

/// Result of one poll, printed as JSON by the `poll` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prs: Option<Vec<PullRequestSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_new_pr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_transmitted: Option<bool>,
}

impl PollOutcome {
    /// `{"success": false}`, reported when no token is configured
    pub fn unsuccessful() -> Self {
        Self::default()
    }
}

/// Fetch open pull requests, decide whether the newest is new, and flash its
/// pulse when a sink is configured.
///
/// The pattern is only transmitted for a new pull request. Fetch and publish
/// failures propagate.
pub async fn poll<S, N>(
    source: &S,
    sink: Option<&N>,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<PollOutcome, PulseError>
where
    S: PullRequestSource + ?Sized,
    N: NotificationSink + ?Sized,
{
    let open = with_deadline(
        "pull request fetch",
        settings.fetch_timeout,
        source.pull_requests(None),
    )
    .await?;
    tracing::debug!(count = open.len(), "fetched open pull requests");

    let summaries = classify(&open, now);
    let selection = select_for_newest(
        &summaries,
        settings.new_pr_threshold,
        &settings.roster,
        &settings.pulse_map,
    )?;

    let has_new_pr = selection.is_some();
    let mut pattern_transmitted = false;

    if let Some(selection) = selection {
        match sink {
            Some(sink) => {
                publish_pulse(sink, &settings.topics, &selection.pulse).await?;
                pattern_transmitted = true;
                tracing::info!(
                    pull_request = selection.summary.id,
                    team = %selection.team,
                    pattern = %selection.pulse.pattern,
                    "transmitted pulse"
                );
            }
            None => tracing::warn!(
                pull_request = selection.summary.id,
                "new pull request but no sink endpoint configured"
            ),
        }
    }

    Ok(PollOutcome {
        success: true,
        prs: Some(summaries),
        has_new_pr: Some(has_new_pr),
        pattern_transmitted: Some(pattern_transmitted),
    })
}

/// The unsuccessful outcome when no token is set, checked from the raw
/// environment so that a run without a token never fails on other settings.
pub fn missing_token_outcome<F>(lookup: F) -> Option<PollOutcome>
where
    F: Fn(&str) -> Option<String>,
{
    match token_from(lookup(ENV_TOKEN_VAR)) {
        Some(_) => None,
        None => Some(PollOutcome::unsuccessful()),
    }
}

/// Poll with clients built from `settings`.
///
/// A missing token yields an unsuccessful outcome before any network call.
pub async fn run(settings: &Settings, now: DateTime<Utc>) -> Result<PollOutcome, PulseError> {
    let Some(token) = settings.token.as_deref() else {
        tracing::warn!("no personal access token configured");
        return Ok(PollOutcome::unsuccessful());
    };

    let client = create_client(token, settings.locator()?)?;
    let sink = settings
        .sink
        .as_ref()
        .map(|sink| HttpNotificationSink::new(sink.endpoint.clone(), sink.token.clone()))
        .transpose()?;

    poll(&client, sink.as_ref(), settings, now).await
}
