use std::future::Future;
use std::time::Duration;

use crate::error::PulseError;

/// Await `future`, failing with `PulseError::Timeout` once `deadline` passes.
/// Used around every joint wait so one hung fetch fails the whole batch.
pub async fn with_deadline<T, F>(
    operation: &str,
    deadline: Duration,
    future: F,
) -> Result<T, PulseError>
where
    F: Future<Output = Result<T, PulseError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(PulseError::Timeout {
            operation: operation.to_string(),
            after: deadline,
        }),
    }
}
