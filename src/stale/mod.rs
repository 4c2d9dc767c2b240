pub mod evaluator;
pub mod report;

pub use evaluator::{Staleness, StalenessEvaluator, DEFAULT_STALE_THRESHOLD_HOURS};
pub use report::{render_report, StaleThreadGroup, StaleThreadRecord, StaleThreadReportBuilder};
