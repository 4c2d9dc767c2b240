//! Error types shared by the polling flow and the stale-thread report.

use thiserror::Error;

/// Errors surfaced while talking to Azure DevOps, the device broker, or while
/// interpreting the data they return.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PulseError {
    /// No personal access token was configured.
    #[error("personal access token is required")]
    MissingCredential,

    /// The service rejected the token (401, or a 203 sign-in page).
    #[error("Azure DevOps rejected the token: {message}")]
    Authentication {
        /// Detail returned with the rejection.
        message: String,
    },

    /// A hosting-service or broker call failed.
    #[error("{}", upstream_message(.pull_request, .message))]
    UpstreamFetch {
        /// Pull request whose fetch failed, when the call was per pull request.
        pull_request: Option<i64>,
        /// Transport or API error detail.
        message: String,
    },

    /// A date from upstream could not be parsed.
    #[error("invalid timestamp: {value:?}")]
    InvalidTimestamp {
        /// The raw value as received.
        value: String,
    },

    /// The age classifier was asked about an empty pull request list.
    #[error("no pull requests to classify")]
    NoPullRequests,

    /// A joint wait exceeded the configured deadline.
    #[error("{operation} timed out after {}", format_deadline(.after))]
    Timeout {
        /// What was being awaited.
        operation: String,
        /// The deadline that elapsed.
        after: std::time::Duration,
    },

    /// A payload or report could not be serialized.
    #[error("failed to encode {what}: {message}")]
    Encode {
        /// What was being encoded.
        what: String,
        /// Serializer error detail.
        message: String,
    },

    /// Settings were missing or malformed.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

fn upstream_message(pull_request: &Option<i64>, message: &str) -> String {
    match pull_request {
        Some(id) => format!("fetch failed for pull request {}: {}", id, message),
        None => format!("upstream call failed: {}", message),
    }
}

fn format_deadline(after: &std::time::Duration) -> String {
    humantime::format_duration(*after).to_string()
}

impl PulseError {
    /// Build an `UpstreamFetch` for a call not tied to one pull request.
    pub fn upstream(message: impl Into<String>) -> Self {
        PulseError::UpstreamFetch {
            pull_request: None,
            message: message.into(),
        }
    }

    /// Build an `Encode` error from a serializer failure.
    pub fn encode(what: &str, error: serde_json::Error) -> Self {
        PulseError::Encode {
            what: what.to_string(),
            message: error.to_string(),
        }
    }

    /// Attach the failing pull request id to an upstream error.
    pub fn for_pull_request(self, id: i64) -> Self {
        match self {
            PulseError::UpstreamFetch { message, .. } => PulseError::UpstreamFetch {
                pull_request: Some(id),
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_upstream_message_names_pull_request() {
        let err = PulseError::upstream("HTTP 500").for_pull_request(42);
        assert_eq!(err.to_string(), "fetch failed for pull request 42: HTTP 500");
    }

    #[test]
    fn test_upstream_message_without_pull_request() {
        let err = PulseError::upstream("connection refused");
        assert_eq!(err.to_string(), "upstream call failed: connection refused");
    }

    #[test]
    fn test_for_pull_request_leaves_other_errors_alone() {
        let err = PulseError::MissingCredential.for_pull_request(7);
        assert_eq!(err, PulseError::MissingCredential);
    }

    #[test]
    fn test_encode_message() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = PulseError::encode("pulse", source);
        assert!(err.to_string().starts_with("failed to encode pulse: "));
        assert!(matches!(err, PulseError::Encode { .. }));
    }

    #[test]
    fn test_timeout_message() {
        let err = PulseError::Timeout {
            operation: "thread fetch".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "thread fetch timed out after 30s");
    }
}
