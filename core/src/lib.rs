//! A thin fetch layer over a pluggable HTTP transport, plus a few future
//! helpers.
//!
//! # Overview
//! `Rfetch` turns a URL and `RequestOptions` into a resolved `HttpRequest`
//! (query parameters, body encoding, inferred content type), runs it through
//! registered interceptors, sends it through a `Transport` and classifies the
//! `HttpResponse` into `Content` or a `FetchError`.
//!
//! # Design
//! - Building and parsing are pure (`Rfetch::build_request`,
//!   `parse_response`); only `Transport::send` does I/O.
//! - Interceptors and the delimiter mode live on the client, not in globals.
//! - Non-2xx responses are `Error::Fetch` values, not panics.
//! - `promises` (delay, retry, never, assert) is independent of the client.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod promises;
pub mod query;
pub mod transport;
pub mod types;

pub use client::{parse_response, IntoRequestUrl, Rfetch};
pub use config::ClientConfig;
pub use error::{BoxError, Error, FetchError, Result};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, RequestParts};
pub use interceptor::{BoxFuture, Interceptor, Interceptors};
pub use transport::{Transport, UreqTransport, UreqTransportError};
pub use types::{Content, Delimiter, ParamValue, RequestBody, RequestOptions};
pub use url::Url;
