use std::future::Future;

use tracing::{debug, warn};

/// Call `operation` until it succeeds or `max_attempts` attempts have failed.
///
/// Returns the first success, or the error from the **last** attempt as-is.
/// There is no pause between attempts; wrap the operation in
/// `delay_value_for` for pacing. At least one attempt is always made.
pub async fn retry<T, E, F, Fut>(mut operation: F, max_attempts: usize) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempts += 1;
                if attempts < max_attempts {
                    debug!(attempt = attempts, max_attempts, "attempt failed, retrying");
                    continue;
                }
                warn!(attempts, "giving up after the final attempt failed");
                return Err(err);
            }
        }
    }
}
