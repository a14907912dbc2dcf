//! Request builder and dispatcher.
//!
//! # Design
//! `Rfetch` owns everything that used to be process-wide state in a fetch
//! helper: the interceptor registry and the delimiter mode. Several clients
//! with different settings can live side by side.
//!
//! Work is split in the host-does-IO style. `build_request` turns a URL and
//! `RequestOptions` into an `HttpRequest` without touching the network and
//! `parse_response` classifies an `HttpResponse` without touching it either.
//! `dispatch` is the glue: build, run interceptors, send, parse.

use std::sync::{PoisonError, RwLock};

use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, FetchError, Result};
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, RequestParts};
use crate::interceptor::Interceptors;
use crate::query::apply_params;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Content, Delimiter, RequestBody, RequestOptions};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

const NO_CONTENT: u16 = 204;

/// Conversion into an absolute request URL.
///
/// A `Url` is taken as-is. Text starting with `/` is resolved against the
/// client's origin; anything else must parse as an absolute URL.
pub trait IntoRequestUrl {
    fn into_request_url(self, origin: Option<&Url>) -> Result<Url, url::ParseError>;
}

impl IntoRequestUrl for Url {
    fn into_request_url(self, _origin: Option<&Url>) -> Result<Url, url::ParseError> {
        Ok(self)
    }
}

impl IntoRequestUrl for &Url {
    fn into_request_url(self, _origin: Option<&Url>) -> Result<Url, url::ParseError> {
        Ok(self.clone())
    }
}

impl IntoRequestUrl for &str {
    fn into_request_url(self, origin: Option<&Url>) -> Result<Url, url::ParseError> {
        if self.starts_with('/') {
            origin.ok_or(url::ParseError::RelativeUrlWithoutBase)?.join(self)
        } else {
            Url::parse(self)
        }
    }
}

impl IntoRequestUrl for &String {
    fn into_request_url(self, origin: Option<&Url>) -> Result<Url, url::ParseError> {
        self.as_str().into_request_url(origin)
    }
}

impl IntoRequestUrl for String {
    fn into_request_url(self, origin: Option<&Url>) -> Result<Url, url::ParseError> {
        self.as_str().into_request_url(origin)
    }
}

/// A fetch client over a pluggable `Transport`.
#[derive(Debug)]
pub struct Rfetch<T> {
    transport: T,
    origin: Option<Url>,
    delimiter: RwLock<Delimiter>,
    interceptors: Interceptors,
}

impl Rfetch<UreqTransport> {
    /// A `ureq`-backed client configured from `RFETCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(UreqTransport::new(), ClientConfig::from_env()?))
    }
}

impl<T: Transport> Rfetch<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            origin: config.origin,
            delimiter: RwLock::new(config.delimiter),
            interceptors: Interceptors::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn origin(&self) -> Option<&Url> {
        self.origin.as_ref()
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub fn delimiter(&self) -> Delimiter {
        *self.delimiter.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies to every request built after this call.
    pub fn set_delimiter(&self, delimiter: Delimiter) {
        *self.delimiter.write().unwrap_or_else(PoisonError::into_inner) = delimiter;
    }

    /// Resolve `url` and `options` into a request, without sending it.
    ///
    /// `options` is only read; the request owns copies of everything.
    pub fn build_request(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<HttpRequest> {
        self.resolve(url, options, options.method.unwrap_or_default())
    }

    /// Build, intercept, send and classify a request.
    ///
    /// Resolves with the response content for 2xx statuses (`Content::Empty`
    /// for 204). Any other status is an `Error::Fetch` carrying the status and
    /// the classified body.
    pub async fn dispatch(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        let request = self.build_request(url, options)?;
        self.send(request).await
    }

    pub async fn get(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        self.send(self.resolve(url, options, HttpMethod::Get)?).await
    }

    pub async fn put(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        self.send(self.resolve(url, options, HttpMethod::Put)?).await
    }

    pub async fn post(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        self.send(self.resolve(url, options, HttpMethod::Post)?).await
    }

    pub async fn patch(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        self.send(self.resolve(url, options, HttpMethod::Patch)?).await
    }

    pub async fn delete(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        self.send(self.resolve(url, options, HttpMethod::Delete)?).await
    }

    #[deprecated(note = "use `Rfetch::delete`")]
    pub async fn remove(&self, url: impl IntoRequestUrl, options: &RequestOptions) -> Result<Content> {
        self.delete(url, options).await
    }

    fn resolve(&self, url: impl IntoRequestUrl, options: &RequestOptions, method: HttpMethod) -> Result<HttpRequest> {
        let mut url = url.into_request_url(self.origin.as_ref())?;
        apply_params(&mut url, &options.params, self.delimiter());

        let encoded = encode_body(method, &options.body)?;

        let mut headers = Vec::with_capacity(options.headers.len() + 1);
        if let Some((_, content_type)) = &encoded {
            let overridden = options
                .headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));
            if !overridden {
                headers.push((CONTENT_TYPE.to_string(), (*content_type).to_string()));
            }
        }
        headers.extend(options.headers.iter().cloned());

        Ok(HttpRequest {
            url,
            parts: RequestParts {
                method,
                headers,
                body: encoded.map(|(body, _)| body),
                timeout: options.timeout,
            },
        })
    }

    async fn send(&self, request: HttpRequest) -> Result<Content> {
        let HttpRequest { url, parts } = request;
        debug!(
            method = %parts.method,
            %url,
            interceptors = self.interceptors.len(),
            "dispatching request"
        );

        let parts = self.interceptors.run(&url, parts).await?;
        let response = self
            .transport
            .send(HttpRequest { url, parts })
            .await
            .map_err(|err| Error::Transport(Box::new(err)))?;

        debug!(status = response.status, "received response");
        parse_response(response)
    }
}

/// Encode `body` for `method`, returning the inferred content type with it.
/// GET requests never carry a body.
fn encode_body(method: HttpMethod, body: &RequestBody) -> Result<Option<(HttpBody, &'static str)>> {
    if method == HttpMethod::Get {
        return Ok(None);
    }
    let encoded = match body {
        RequestBody::Empty => None,
        RequestBody::Raw(text) => Some((HttpBody::Text(text.clone()), APPLICATION_JSON)),
        RequestBody::Form(entries) => Some((HttpBody::Form(entries.clone()), FORM_URLENCODED)),
        RequestBody::Structured(value) => {
            let text = serde_json::to_string(value).map_err(Error::Serialize)?;
            Some((HttpBody::Text(text), APPLICATION_JSON))
        }
    };
    Ok(encoded)
}

/// Classify a raw response into content or a `FetchError`.
pub fn parse_response(response: HttpResponse) -> Result<Content> {
    if response.status == NO_CONTENT {
        return Ok(Content::Empty);
    }

    let success = response.is_success();
    let status = response.status;
    let content = classify(response)?;

    if success {
        Ok(content)
    } else {
        Err(FetchError { status, content }.into())
    }
}

/// A `Content-Type` mentioning "json" anywhere (any case) means JSON.
fn classify(response: HttpResponse) -> Result<Content> {
    let is_json = response
        .header(CONTENT_TYPE)
        .is_some_and(|value| value.to_ascii_lowercase().contains("json"));

    if is_json {
        serde_json::from_str(&response.body)
            .map(Content::Json)
            .map_err(Error::Deserialize)
    } else {
        Ok(Content::Text(response.body))
    }
}
