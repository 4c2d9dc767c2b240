use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::age::{is_new, PullRequestSummary};
use super::team::{attribute, TeamRoster};
use crate::error::PulseError;

/// Light pattern sent to the device: one character per tick, `1` on and `0`
/// off, each tick lasting `interval` milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PulseDefinition {
    pub pattern: String,
    pub interval: u64,
}

impl PulseDefinition {
    pub fn new(pattern: &str, interval: u64) -> Self {
        Self {
            pattern: pattern.to_string(),
            interval,
        }
    }
}

/// Which pattern to flash for a new pull request.
///
/// Example JSON (as accepted in `PR_PULSE_PULSE_MAP`):
/// ```json
/// {
///   "newPr": { "pattern": "1010101010", "interval": 250 },
///   "newTeamPr": { "Danakil": { "pattern": "110011001100", "interval": 150 } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PulseMap {
    #[serde(alias = "new_pr")]
    pub new_pr: PulseDefinition,
    #[serde(default, alias = "new_team_pr")]
    pub new_team_pr: BTreeMap<String, PulseDefinition>,
}

/// Patterns for the three named teams. Only Danakil has members in the
/// default roster; Sahara and Kalahari patterns apply once a configured
/// roster lists their members.
impl Default for PulseMap {
    fn default() -> Self {
        let new_team_pr = [
            ("Danakil", PulseDefinition::new("1100110011001100", 150)),
            ("Sahara", PulseDefinition::new("1110001110001110", 200)),
            ("Kalahari", PulseDefinition::new("1010100000101010", 120)),
        ]
        .into_iter()
        .map(|(team, pulse)| (team.to_string(), pulse))
        .collect();

        Self {
            new_pr: PulseDefinition::new("1010101010", 250),
            new_team_pr,
        }
    }
}

impl PulseMap {
    /// Team-specific pattern, or the generic new-PR pattern
    pub fn for_team(&self, team: &str) -> &PulseDefinition {
        self.new_team_pr.get(team).unwrap_or(&self.new_pr)
    }
}

/// Outcome of selecting a pulse for the newest pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseSelection {
    pub summary: PullRequestSummary,
    pub team: String,
    pub pulse: PulseDefinition,
}

pub fn select(
    summary: &PullRequestSummary,
    roster: &TeamRoster,
    pulse_map: &PulseMap,
) -> PulseDefinition {
    let team = attribute(summary, roster);
    pulse_map.for_team(team).clone()
}

/// Select a pulse for the youngest summary when it is new. `summaries` must
/// be sorted youngest first (as `classify` returns them). No pull requests,
/// or none new enough, means nothing to flash.
pub fn select_for_newest(
    summaries: &[PullRequestSummary],
    threshold: Duration,
    roster: &TeamRoster,
    pulse_map: &PulseMap,
) -> Result<Option<PulseSelection>, PulseError> {
    let Some(newest) = summaries.first() else {
        return Ok(None);
    };
    if !is_new(summaries, threshold)? {
        return Ok(None);
    }

    let team = attribute(newest, roster).to_string();
    let pulse = pulse_map.for_team(&team).clone();
    Ok(Some(PulseSelection {
        summary: newest.clone(),
        team,
        pulse,
    }))
}
