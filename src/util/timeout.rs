//! Deadline helper for model and tool calls.

use std::future::Future;
use std::time::Duration;

use crate::error::ReckonError;

/// Run `future` with a deadline, mapping expiry to [`ReckonError::Timeout`].
///
/// The inner future is dropped on expiry.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ReckonError>>,
) -> Result<T, ReckonError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ReckonError::Timeout(duration.as_millis() as u64)),
    }
}
