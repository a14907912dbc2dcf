use std::future::Future;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Content;

pub const DEFAULT_MESSAGE: &str = "Value does not satisfy predicate";

/// Await `future` and check its output against `predicate`.
///
/// Yields the output unchanged when the predicate holds, otherwise
/// `Error::PredicateNotSatisfied` with `message` or [`DEFAULT_MESSAGE`].
pub async fn assert<F, P>(future: F, predicate: P, message: Option<&str>) -> Result<F::Output>
where
    F: Future,
    P: FnOnce(&F::Output) -> bool,
{
    let value = future.await;
    if predicate(&value) {
        Ok(value)
    } else {
        Err(not_satisfied(message))
    }
}

/// Values that can be "absent" or "null".
///
/// Only those two markers count; `0`, `""` and `false` are defined.
pub trait Defined {
    type Value;

    fn into_defined(self) -> Option<Self::Value>;
}

impl<T> Defined for Option<T> {
    type Value = T;

    fn into_defined(self) -> Option<T> {
        self
    }
}

impl Defined for Value {
    type Value = Value;

    fn into_defined(self) -> Option<Value> {
        match self {
            Value::Null => None,
            value => Some(value),
        }
    }
}

impl Defined for Content {
    type Value = Content;

    fn into_defined(self) -> Option<Content> {
        match self {
            Content::Empty | Content::Json(Value::Null) => None,
            content => Some(content),
        }
    }
}

/// [`assert`] specialised to "is defined", unwrapping the value.
pub async fn assert_defined<F>(future: F, message: Option<&str>) -> Result<<F::Output as Defined>::Value>
where
    F: Future,
    F::Output: Defined,
{
    future.await.into_defined().ok_or_else(|| not_satisfied(message))
}

fn not_satisfied(message: Option<&str>) -> Error {
    Error::PredicateNotSatisfied {
        message: message.unwrap_or(DEFAULT_MESSAGE).to_string(),
    }
}
