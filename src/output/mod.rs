pub mod formatter;

pub use formatter::{format_age, format_history_table, format_stale_hours, should_use_colors};
