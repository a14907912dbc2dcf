//! Futures that never complete, for exercising loading states by hand.

use std::future::{pending, Future, Pending};

use tracing::warn;

/// A future that stays pending forever.
pub fn never<T>() -> Pending<T> {
    pending()
}

/// Park a call site that would normally await `input`.
///
/// Logs one warning naming `input` so the placeholder is hard to ship by
/// accident. `input` is never polled.
pub fn never_with<F: Future>(input: &F) -> Pending<F::Output> {
    warn!(
        future = std::any::type_name::<F>(),
        address = ?std::ptr::from_ref(input),
        "future is being routed through `never`, make sure this does not get deployed"
    );
    pending()
}
