use chrono::{DateTime, Duration, Utc};

/// Default time a follow-up commit may sit before the thread it left
/// unanswered counts as stale
pub const DEFAULT_STALE_THRESHOLD_HOURS: i64 = 16;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Staleness {
    NotStale,
    /// Hours since the first commit that followed the thread
    Stale { hours: f64 },
}

impl Staleness {
    pub fn hours(&self) -> Option<f64> {
        match self {
            Staleness::NotStale => None,
            Staleness::Stale { hours } => Some(*hours),
        }
    }
}

/// Decides whether a review thread was left behind by later commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessEvaluator {
    threshold: Duration,
}

impl Default for StalenessEvaluator {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_STALE_THRESHOLD_HOURS))
    }
}

impl StalenessEvaluator {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// The earliest commit strictly after `thread_last_updated` decides: if
    /// more than the threshold has passed since it, the thread is stale.
    /// Without such a commit the thread is the latest event and not stale.
    pub fn evaluate(
        &self,
        thread_last_updated: DateTime<Utc>,
        commit_timestamps: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) -> Staleness {
        let mut sorted = commit_timestamps.to_vec();
        sorted.sort();

        let Some(first_after) = sorted.into_iter().find(|t| *t > thread_last_updated) else {
            return Staleness::NotStale;
        };

        // Compared at the precision the hours are reported in
        let since_ms = (now - first_after).num_milliseconds();
        if since_ms > self.threshold.num_milliseconds() {
            Staleness::Stale {
                hours: since_ms as f64 / MILLIS_PER_HOUR,
            }
        } else {
            Staleness::NotStale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_commits_is_not_stale() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::days(3);
        assert_eq!(evaluator.evaluate(thread, &[], now()), Staleness::NotStale);
    }

    #[test]
    fn test_commits_before_thread_are_ignored() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(20);
        let commits = [
            thread - Duration::hours(1),
            thread - Duration::days(2),
            thread, // same instant is not "after"
        ];
        assert_eq!(evaluator.evaluate(thread, &commits, now()), Staleness::NotStale);
    }

    #[test]
    fn test_single_old_commit_after_thread_is_stale() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(30);
        let commit = now() - Duration::hours(25);
        assert_eq!(
            evaluator.evaluate(thread, &[commit], now()),
            Staleness::Stale { hours: 25.0 }
        );
    }

    #[test]
    fn test_recent_commit_after_thread_is_not_stale() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(30);
        assert_eq!(
            evaluator.evaluate(thread, &[now() - Duration::hours(3)], now()),
            Staleness::NotStale
        );
        // exactly at the threshold is still fresh
        assert_eq!(
            evaluator.evaluate(thread, &[now() - Duration::hours(16)], now()),
            Staleness::NotStale
        );
    }

    #[test]
    fn test_sub_millisecond_overshoot_is_not_stale() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(30);
        let commit = now() - Duration::hours(16) - Duration::microseconds(300);
        assert_eq!(evaluator.evaluate(thread, &[commit], now()), Staleness::NotStale);
    }

    #[test]
    fn test_just_past_threshold_reports_more_than_threshold() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(30);
        let commit = now() - Duration::hours(16) - Duration::milliseconds(1);
        let hours = evaluator.evaluate(thread, &[commit], now()).hours().unwrap();
        assert!(hours > 16.0, "stale hours {} not above threshold", hours);
    }

    #[test]
    fn test_earliest_following_commit_decides_regardless_of_input_order() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(48);
        let commits = [
            now() - Duration::hours(2),
            now() - Duration::hours(40),
            now() - Duration::hours(60),
        ];
        assert_eq!(
            evaluator.evaluate(thread, &commits, now()),
            Staleness::Stale { hours: 40.0 }
        );
    }

    #[test]
    fn test_fresh_first_commit_wins_over_older_history() {
        // the first commit after the thread is recent, so later ones don't matter
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::hours(5);
        let commits = [now() - Duration::hours(4), now() - Duration::hours(1)];
        assert_eq!(evaluator.evaluate(thread, &commits, now()), Staleness::NotStale);
    }

    #[test]
    fn test_fractional_hours() {
        let evaluator = StalenessEvaluator::default();
        let thread = now() - Duration::days(2);
        let commit = now() - Duration::minutes(16 * 60 + 30);
        let result = evaluator.evaluate(thread, &[commit], now());
        assert_eq!(result.hours(), Some(16.5));
    }

    #[test]
    fn test_custom_threshold() {
        let evaluator = StalenessEvaluator::new(Duration::hours(2));
        let thread = now() - Duration::hours(5);
        let commit = now() - Duration::hours(3);
        assert_eq!(
            evaluator.evaluate(thread, &[commit], now()),
            Staleness::Stale { hours: 3.0 }
        );
    }
}
