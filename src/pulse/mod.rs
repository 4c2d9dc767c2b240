//! New pull request detection: age classification, team attribution and
//! pulse pattern selection.

pub mod age;
pub mod selector;
pub mod team;

pub use age::{classify, is_new, PullRequestSummary, DEFAULT_NEW_PR_THRESHOLD_MINUTES};
pub use selector::{select, select_for_newest, PulseDefinition, PulseMap, PulseSelection};
pub use team::{attribute, Team, TeamRoster, DEFAULT_TEAM};
