use super::Settings;
use crate::pulse::PulseDefinition;

/// Validate settings at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if settings.new_pr_threshold <= chrono::Duration::zero() {
        errors.push("new_pr_threshold: must be greater than zero".to_string());
    }
    if settings.stale_threshold <= chrono::Duration::zero() {
        errors.push("stale_threshold: must be greater than zero".to_string());
    }
    if settings.fetch_timeout.is_zero() {
        errors.push("fetch_timeout: must be greater than zero".to_string());
    }

    for (i, team) in settings.roster.teams.iter().enumerate() {
        if team.name.trim().is_empty() {
            errors.push(format!("roster[{}].name: must not be empty", i));
        }
    }

    validate_pulse("pulse_map.new_pr", &settings.pulse_map.new_pr, &mut errors);
    for (team, pulse) in &settings.pulse_map.new_team_pr {
        validate_pulse(&format!("pulse_map.new_team_pr.{}", team), pulse, &mut errors);
    }

    if settings.topics.pattern.trim().is_empty() {
        errors.push("topics.pattern: must not be empty".to_string());
    }
    if settings.topics.switch.trim().is_empty() {
        errors.push("topics.switch: must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pulse(field: &str, pulse: &PulseDefinition, errors: &mut Vec<String>) {
    if pulse.pattern.is_empty() {
        errors.push(format!("{}.pattern: must not be empty", field));
    } else if let Some(bad) = pulse.pattern.chars().find(|c| *c != '0' && *c != '1') {
        errors.push(format!(
            "{}.pattern: invalid character '{}' in '{}' (use 1 for on, 0 for off)",
            field, bad, pulse.pattern
        ));
    }
    if pulse.interval == 0 {
        errors.push(format!("{}.interval: must be greater than zero", field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::{PulseMap, Team};

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_invalid_pattern_character() {
        let mut settings = Settings::default();
        settings.pulse_map.new_pr = PulseDefinition::new("10x1", 100);
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("pulse_map.new_pr.pattern"));
        assert!(errors[0].contains("'x'"));
    }

    #[test]
    fn test_team_pulse_errors_name_the_team() {
        let mut settings = Settings::default();
        settings.pulse_map = PulseMap {
            new_pr: PulseDefinition::new("1", 100),
            new_team_pr: [("Sahara".to_string(), PulseDefinition::new("", 0))]
                .into_iter()
                .collect(),
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("pulse_map.new_team_pr.Sahara.pattern"));
        assert!(errors[1].contains("pulse_map.new_team_pr.Sahara.interval"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut settings = Settings::default();
        settings.new_pr_threshold = chrono::Duration::zero(); // Error 1
        settings.fetch_timeout = std::time::Duration::ZERO; // Error 2
        settings.roster.teams.push(Team {
            name: " ".to_string(), // Error 3
            members: vec![],
        });
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[2].contains("roster[1].name"));
    }
}
