//! Bounded retry for transient failures. Callers opt in; the transport never
//! retries on its own.

use std::{fmt::Display, future::Future, time::Duration};
use tokio::time::sleep;
use tracing::debug;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Runs `op` until it succeeds, at most `retries + 1` times, sleeping `delay`
/// between attempts. The error of the last attempt is returned on exhaustion.
///
/// # Errors
/// Returns the final error once no attempts remain.
pub async fn retry_request<T, E, F, Fut>(mut op: F, retries: u32, delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut remaining = retries;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if remaining > 0 => {
                debug!(
                    "Request failed ({}), retrying in {:?}, {} retries left",
                    err, delay, remaining
                );
                sleep(delay).await;
                remaining -= 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// [`retry_request`] with three retries one second apart.
///
/// # Errors
/// Returns the final error once no attempts remain.
pub async fn retry_with_defaults<T, E, F, Fut>(op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_request(op, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY).await
}
