pub mod config;
pub mod credentials;
pub mod deadline;
pub mod devops;
pub mod error;
pub mod history;
pub mod logging;
pub mod notify;
pub mod output;
pub mod poll;
pub mod pulse;
pub mod stale;
