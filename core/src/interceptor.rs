//! Request interceptors.
//!
//! # Design
//! An interceptor sees the resolved URL read-only and the current
//! `RequestParts` by value, and returns the parts the next interceptor (or
//! the transport) receives. The chain is a plain loop with an accumulator.
//!
//! The registry hands out `Arc` handles; removal is by pointer identity, so
//! the handle returned from `add` is the key used to take it out again.

use std::future::{self, Future};
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use url::Url;

use crate::error::{BoxError, Error};
use crate::http::RequestParts;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A transform applied to every request right before it is sent.
///
/// Synchronous closures of the shape
/// `Fn(&Url, RequestParts) -> Result<RequestParts, BoxError>` implement this
/// trait directly; async interceptors implement it by hand.
pub trait Interceptor: Send + Sync {
    fn intercept<'a>(
        &'a self,
        url: &'a Url,
        parts: RequestParts,
    ) -> BoxFuture<'a, Result<RequestParts, BoxError>>;
}

impl<F> Interceptor for F
where
    F: Fn(&Url, RequestParts) -> Result<RequestParts, BoxError> + Send + Sync,
{
    fn intercept<'a>(
        &'a self,
        url: &'a Url,
        parts: RequestParts,
    ) -> BoxFuture<'a, Result<RequestParts, BoxError>> {
        Box::pin(future::ready((self)(url, parts)))
    }
}

/// Ordered interceptor registry. Registration order is invocation order.
#[derive(Default)]
pub struct Interceptors {
    chain: RwLock<Vec<Arc<dyn Interceptor>>>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `interceptor` and return the handle needed to remove it.
    pub fn add<I: Interceptor + 'static>(&self, interceptor: I) -> Arc<dyn Interceptor> {
        let handle: Arc<dyn Interceptor> = Arc::new(interceptor);
        self.add_arc(Arc::clone(&handle));
        handle
    }

    pub fn add_arc(&self, interceptor: Arc<dyn Interceptor>) {
        self.chain.write().unwrap_or_else(PoisonError::into_inner).push(interceptor);
    }

    /// Remove the first registration of `interceptor`. No-op when absent.
    pub fn remove(&self, interceptor: &Arc<dyn Interceptor>) {
        let mut chain = self.chain.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = chain.iter().position(|entry| Arc::ptr_eq(entry, interceptor)) {
            chain.remove(index);
        }
    }

    pub fn clear(&self) {
        self.chain.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.chain.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the chain as registered right now.
    ///
    /// The registry is read once when the chain starts. Registrations that
    /// change while it runs only apply to later calls; nothing guards against
    /// that race.
    pub async fn run(&self, url: &Url, parts: RequestParts) -> Result<RequestParts, Error> {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner).clone();

        let mut parts = parts;
        for interceptor in &chain {
            parts = interceptor.intercept(url, parts).await.map_err(Error::Interceptor)?;
        }
        Ok(parts)
    }
}

impl std::fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptors").field("len", &self.len()).finish()
    }
}
