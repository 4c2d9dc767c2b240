use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;

use super::evaluator::StalenessEvaluator;
use crate::deadline::with_deadline;
use crate::devops::{
    CommentThread, CommitSource, PullRequest, PullRequestSource, RepositoryLocator, ThreadSource,
};
use crate::error::PulseError;
use crate::output::format_stale_hours;

#[derive(Debug, Clone, PartialEq)]
pub struct StaleThreadRecord {
    pub thread: CommentThread,
    pub stale_hours: f64,
}

/// A pull request together with its stale threads (never empty)
#[derive(Debug, Clone, PartialEq)]
pub struct StaleThreadGroup {
    pub pull_request: PullRequest,
    pub threads: Vec<StaleThreadRecord>,
}

/// Collects stale review threads across all open pull requests.
///
/// Thread fetches for all pull requests run concurrently, then commit fetches
/// for the pull requests that still have active threads. A failed fetch for
/// any single pull request aborts the whole report: a partial report would
/// read the same as "nothing is stale" for the pull requests it skipped.
pub struct StaleThreadReportBuilder<'a, S> {
    source: &'a S,
    evaluator: StalenessEvaluator,
    fetch_timeout: Duration,
}

impl<'a, S> StaleThreadReportBuilder<'a, S>
where
    S: PullRequestSource + ThreadSource + CommitSource,
{
    pub fn new(source: &'a S, evaluator: StalenessEvaluator, fetch_timeout: Duration) -> Self {
        Self {
            source,
            evaluator,
            fetch_timeout,
        }
    }

    pub async fn build(&self, now: DateTime<Utc>) -> Result<Vec<StaleThreadGroup>, PulseError> {
        let pull_requests = with_deadline(
            "pull request fetch",
            self.fetch_timeout,
            self.source.pull_requests(None),
        )
        .await?;
        tracing::debug!(count = pull_requests.len(), "open pull requests");

        let with_threads = with_deadline(
            "thread fetch",
            self.fetch_timeout,
            try_join_all(pull_requests.into_iter().map(|pr| async move {
                let threads = self
                    .source
                    .threads(pr.id)
                    .await
                    .map_err(|e| e.for_pull_request(pr.id))?;
                Ok::<_, PulseError>((pr, threads))
            })),
        )
        .await?;

        let candidates: Vec<(PullRequest, Vec<CommentThread>)> = with_threads
            .into_iter()
            .map(|(pr, threads)| {
                let active: Vec<_> = threads.into_iter().filter(CommentThread::is_active).collect();
                (pr, active)
            })
            .filter(|(_, threads)| !threads.is_empty())
            .collect();
        tracing::debug!(count = candidates.len(), "pull requests with active threads");

        let with_commits = with_deadline(
            "commit fetch",
            self.fetch_timeout,
            try_join_all(candidates.into_iter().map(|(pr, threads)| async move {
                let commits = self
                    .source
                    .commits(pr.id)
                    .await
                    .map_err(|e| e.for_pull_request(pr.id))?;
                Ok::<_, PulseError>((pr, threads, commits))
            })),
        )
        .await?;

        let groups: Vec<StaleThreadGroup> = with_commits
            .into_iter()
            .filter_map(|(pull_request, threads, commits)| {
                let commit_times: Vec<_> = commits.iter().map(|c| c.committed_at).collect();
                let stale: Vec<StaleThreadRecord> = threads
                    .into_iter()
                    .filter_map(|thread| {
                        self.evaluator
                            .evaluate(thread.last_updated, &commit_times, now)
                            .hours()
                            .map(|stale_hours| StaleThreadRecord {
                                thread,
                                stale_hours,
                            })
                    })
                    .collect();

                if stale.is_empty() {
                    None
                } else {
                    Some(StaleThreadGroup {
                        pull_request,
                        threads: stale,
                    })
                }
            })
            .collect();

        tracing::debug!(count = groups.len(), "pull requests with stale threads");
        Ok(groups)
    }
}

/// Render stale thread groups as a chat-friendly text report
pub fn render_report(groups: &[StaleThreadGroup], locator: &RepositoryLocator) -> String {
    let mut output = String::from("*STALE THREADS:*\n");
    for group in groups {
        let pr = &group.pull_request;
        let link = locator.web_url(pr.repository.as_deref(), pr.id);
        output.push_str(&format!("*{}*: {}:\n", pr.title, link));
        for record in &group.threads {
            output.push_str(&format!(
                "\t* {} stale: \"{}\"\n",
                format_stale_hours(record.stale_hours),
                record.thread.headline()
            ));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devops::fakes::{active_thread, commit, pull_request, FakeDevOps};
    use crate::devops::{Comment, CommentType, ThreadStatus};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use reqwest::Url;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn hours_ago(h: i64) -> DateTime<Utc> {
        now() - ChronoDuration::hours(h)
    }

    fn locator() -> RepositoryLocator {
        RepositoryLocator {
            org_url: Url::parse("https://dev.azure.com/contoso").unwrap(),
            project: "Web".to_string(),
            repository_id: "654d".to_string(),
        }
    }

    fn builder(source: &FakeDevOps) -> StaleThreadReportBuilder<'_, FakeDevOps> {
        StaleThreadReportBuilder::new(
            source,
            StalenessEvaluator::default(),
            Duration::from_secs(5),
        )
    }

    /// PR 1: one stale thread, one answered thread
    /// PR 2: active thread but the follow-up commit is recent
    /// PR 3: only a resolved thread
    fn sample_source() -> FakeDevOps {
        let mut source = FakeDevOps {
            pull_requests: vec![
                pull_request(1, "Josh Boyce", hours_ago(100)),
                pull_request(2, "Ana Diaz", hours_ago(100)),
                pull_request(3, "Lee Chen", hours_ago(100)),
            ],
            ..Default::default()
        };

        source.threads.insert(
            1,
            vec![
                active_thread(10, "Can this be async?", hours_ago(50)),
                active_thread(11, "Typo here", hours_ago(1)),
            ],
        );
        source
            .commits
            .insert(1, vec![commit("a", hours_ago(60)), commit("b", hours_ago(25))]);

        source
            .threads
            .insert(2, vec![active_thread(20, "Needs a test", hours_ago(10))]);
        source.commits.insert(2, vec![commit("c", hours_ago(4))]);

        let mut resolved = active_thread(30, "Fixed already", hours_ago(50));
        resolved.status = ThreadStatus::Fixed;
        source.threads.insert(3, vec![resolved]);
        source.commits.insert(3, vec![commit("d", hours_ago(40))]);
        source
    }

    #[tokio::test]
    async fn test_build_keeps_only_stale_threads() {
        let source = sample_source();
        let groups = builder(&source).build(now()).await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pull_request.id, 1);
        assert_eq!(groups[0].threads.len(), 1);
        assert_eq!(groups[0].threads[0].thread.id, 10);
        assert_eq!(groups[0].threads[0].stale_hours, 25.0);
    }

    #[tokio::test]
    async fn test_commits_not_fetched_for_pull_requests_without_active_threads() {
        let mut source = sample_source();
        // would fail if the builder asked for PR 3's commits
        source.failing_commits.insert(3);
        let groups = builder(&source).build(now()).await.unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[tokio::test]
    async fn test_thread_fetch_failure_names_pull_request() {
        let mut source = sample_source();
        source.failing_threads.insert(2);

        let err = builder(&source).build(now()).await.unwrap_err();
        assert!(matches!(
            err,
            PulseError::UpstreamFetch {
                pull_request: Some(2),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_commit_fetch_failure_aborts_report() {
        let mut source = sample_source();
        source.failing_commits.insert(1);

        let err = builder(&source).build(now()).await.unwrap_err();
        assert!(matches!(
            err,
            PulseError::UpstreamFetch {
                pull_request: Some(1),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_no_pull_requests_gives_empty_report() {
        let source = FakeDevOps::default();
        let groups = builder(&source).build(now()).await.unwrap();
        assert!(groups.is_empty());
        assert_eq!(render_report(&groups, &locator()), "*STALE THREADS:*\n");
    }

    #[test]
    fn test_render_layout() {
        let mut pr = pull_request(7, "Josh Boyce", hours_ago(100));
        pr.title = "Add pulse patterns".to_string();
        let mut thread = active_thread(70, "Why a string here?", hours_ago(80));
        thread.comments.push(Comment {
            comment_type: CommentType::Text,
            content: Some("reply".to_string()),
        });

        let groups = vec![StaleThreadGroup {
            pull_request: pr,
            threads: vec![
                StaleThreadRecord {
                    thread: thread.clone(),
                    stale_hours: 25.0,
                },
                StaleThreadRecord {
                    thread: active_thread(71, "Rename?", hours_ago(80)),
                    stale_hours: 16.4,
                },
            ],
        }];

        assert_eq!(
            render_report(&groups, &locator()),
            "*STALE THREADS:*\n\
             *Add pulse patterns*: https://dev.azure.com/contoso/Web/_git/cactus-ui/pullrequest/7:\n\
             \t* 1 days, 1hrs stale: \"Why a string here?\"\n\
             \t* 16hrs stale: \"Rename?\"\n\
             \n"
        );
    }
}
