use chrono::Duration;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::history::TimeSpanSummary;

const MAX_TITLE_WIDTH: usize = 60;

/// Format stale hours as "{days} days, {hours}hrs", or "{hours}hrs" under a day.
/// Whole days are split off first and only the remainder is rounded, so
/// 23.6 hours reads "24hrs" and 47.6 hours "1 days, 24hrs".
pub fn format_stale_hours(hours: f64) -> String {
    let hours = hours.max(0.0);
    let days = (hours / 24.0).floor() as u64;
    let remainder = (hours % 24.0).round() as u64;

    if days > 0 {
        format!("{} days, {}hrs", days, remainder)
    } else {
        format!("{}hrs", remainder)
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Cut a title to `max_chars` characters, ending in "..." when shortened
fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = title.chars().take(keep).collect();
    cut.push_str(&".".repeat(max_chars - keep));
    cut
}

/// Format completed pull requests as one line each: id, time open, title.
/// Pull requests without a completion date show "open".
pub fn format_history_table(summaries: &[TimeSpanSummary], use_colors: bool) -> String {
    if summaries.is_empty() {
        return "No completed pull requests found.".to_string();
    }

    summaries
        .iter()
        .map(|summary| {
            let id = format!("#{:<6}", summary.id);
            let open_for = summary
                .open_duration()
                .map(format_age)
                .unwrap_or_else(|| "open".to_string());
            let open_for = format!("{:>5}", open_for);
            let title = truncate_title(&summary.description, MAX_TITLE_WIDTH);

            if use_colors {
                format!("{} {}  {}", id.dimmed(), open_for.bold(), title)
            } else {
                format!("{} {}  {}", id, open_for, title)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// How long a pull request stayed open: "2d5h", "5h", "40m", or "<1m".
/// Hours are dropped from the day form once a pull request ran a full day
/// with none left over.
pub fn format_age(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours() - days * 24;

    match (days, hours) {
        (d, 0) if d > 0 => format!("{}d", d),
        (d, h) if d > 0 => format!("{}d{}h", d, h),
        (_, h) if h > 0 => format!("{}h", h),
        _ => match duration.num_minutes() {
            m if m > 0 => format!("{}m", m),
            _ => "<1m".to_string(),
        },
    }
}
