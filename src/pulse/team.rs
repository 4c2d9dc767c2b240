use serde::{Deserialize, Serialize};

use super::age::PullRequestSummary;

/// Team reported for authors not on any roster entry
pub const DEFAULT_TEAM: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Team {
    pub name: String,
    /// Display names exactly as the hosting service reports them
    #[serde(default)]
    pub members: Vec<String>,
}

/// Ordered team list. Declaration order breaks ties when an author appears
/// in more than one team.
///
/// Example YAML:
/// ```yaml
/// roster:
///   - name: Danakil
///     members: ["Josh Boyce"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TeamRoster {
    pub teams: Vec<Team>,
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self {
            teams: vec![Team {
                name: "Danakil".to_string(),
                members: vec!["Josh Boyce".to_string()],
            }],
        }
    }
}

impl TeamRoster {
    /// Team of `author`, matched on the exact display name (no case folding
    /// or whitespace normalisation)
    pub fn team_of(&self, author: &str) -> &str {
        self.teams
            .iter()
            .find(|team| team.members.iter().any(|m| m == author))
            .map(|team| team.name.as_str())
            .unwrap_or(DEFAULT_TEAM)
    }
}

pub fn attribute<'a>(summary: &PullRequestSummary, roster: &'a TeamRoster) -> &'a str {
    roster.team_of(&summary.author)
}
