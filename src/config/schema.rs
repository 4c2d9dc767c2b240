use serde::{Deserialize, Serialize};

use crate::pulse::{PulseMap, TeamRoster};

/// Optional YAML file carrying the lookup tables that change more often
/// than the deployment does.
///
/// ```yaml
/// roster:
///   - name: Danakil
///     members: ["Josh Boyce"]
/// pulse_map:
///   new_pr: { pattern: "1010101010", interval: 250 }
///   new_team_pr:
///     Danakil: { pattern: "1100110011001100", interval: 150 }
/// ```
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub roster: Option<TeamRoster>,
    #[serde(default)]
    pub pulse_map: Option<PulseMap>,
}
