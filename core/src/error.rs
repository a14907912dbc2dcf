//! Error types for rfetch.
//!
//! # Design
//! A non-2xx response is an expected outcome, not a crash: it lands in
//! `Error::Fetch` as a plain `FetchError { status, content }` value that
//! callers can match on. Everything else is a failure of the machinery
//! around the request (URL, transport, interceptors, serde).

use crate::types::Content;

/// Boxed error produced by transports and interceptors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A non-success response, with its status and classified body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("request failed with status {status}")]
pub struct FetchError {
    pub status: u16,
    pub content: Content,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed url: {0}")]
    MalformedUrl(#[from] url::ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{message}")]
    PredicateNotSatisfied { message: String },

    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    #[error("interceptor failed: {0}")]
    Interceptor(#[source] BoxError),

    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("unknown delimiter {0:?}, expected \"comma\" or \"duplicate\"")]
    InvalidDelimiter(String),
}

impl Error {
    /// `true` when the server answered with a non-success status.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }

    pub fn as_fetch_error(&self) -> Option<&FetchError> {
        match self {
            Error::Fetch(err) => Some(err),
            _ => None,
        }
    }

    /// Status of a fetch error, if this is one.
    pub fn status(&self) -> Option<u16> {
        self.as_fetch_error().map(|err| err.status)
    }
}
