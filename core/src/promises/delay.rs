//! Minimum-latency helpers.
//!
//! Instant responses make spinners flash and users doubt anything happened.
//! These helpers pad a future out to a minimum duration without ever
//! shortening a slower one.
//!
//! Deadlines are taken when the helper is called, not when the returned
//! future is first polled.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

pub const DEFAULT_FALLBACK: Duration = Duration::from_millis(500);

static FALLBACK_MS: AtomicU64 = AtomicU64::new(500);

const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Process-wide default used when no explicit duration is given.
pub fn fallback() -> Duration {
    Duration::from_millis(FALLBACK_MS.load(Ordering::Relaxed))
}

/// Change the default for every later call, process-wide.
pub fn set_fallback(duration: Duration) {
    let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    FALLBACK_MS.store(ms, Ordering::Relaxed);
}

/// Sleep for the fallback duration.
pub fn delay() -> impl Future<Output = ()> {
    delay_for(fallback())
}

/// Durations past the timer's range are clamped to roughly thirty years.
pub fn delay_for(duration: Duration) -> impl Future<Output = ()> {
    let now = Instant::now();
    let deadline = now.checked_add(duration).unwrap_or_else(|| now + FAR_FUTURE);
    async move { sleep_until(deadline).await }
}

/// Resolve with `future`'s output, but not before the fallback duration.
pub fn delay_value<F: Future>(future: F) -> impl Future<Output = F::Output> {
    delay_value_for(future, fallback())
}

/// Both the future and the timer must finish; the output is the future's.
pub fn delay_value_for<F: Future>(future: F, duration: Duration) -> impl Future<Output = F::Output> {
    let timer = delay_for(duration);
    async move {
        let (output, ()) = tokio::join!(future, timer);
        output
    }
}

/// Like [`delay_value`], but an error surfaces as soon as `future` fails.
pub fn try_delay_value<F, T, E>(future: F) -> impl Future<Output = Result<T, E>>
where
    F: Future<Output = Result<T, E>>,
{
    try_delay_value_for(future, fallback())
}

pub fn try_delay_value_for<F, T, E>(future: F, duration: Duration) -> impl Future<Output = Result<T, E>>
where
    F: Future<Output = Result<T, E>>,
{
    let timer = delay_for(duration);
    async move {
        let (value, ()) = tokio::try_join!(future, async {
            timer.await;
            Ok::<(), E>(())
        })?;
        Ok(value)
    }
}
