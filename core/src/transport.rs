//! The network seam.
//!
//! `Rfetch` never opens a socket itself: it hands a resolved `HttpRequest`
//! to a `Transport` and classifies whatever `HttpResponse` comes back.
//! `UreqTransport` is the stock implementation; tests plug in their own.

use std::future::Future;
use std::time::Duration;

use ureq::{http, AsSendBody};
use url::form_urlencoded;

use crate::http::{HttpBody, HttpRequest, HttpResponse};

/// Sends a resolved request and returns the raw response.
///
/// Non-2xx statuses are data, not errors: an implementation only fails when
/// no response could be obtained at all.
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, Self::Error>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum UreqTransportError {
    #[error(transparent)]
    Ureq(#[from] ureq::Error),

    #[error(transparent)]
    Http(#[from] http::Error),

    #[error("blocking send task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Blocking `ureq` agent driven from a `spawn_blocking` task.
///
/// Status codes are returned as data (`http_status_as_error(false)`) so
/// that `Rfetch` decides what counts as a failure.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. It should have `http_status_as_error`
    /// disabled, otherwise 4xx/5xx surface as transport errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    type Error = UreqTransportError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request)).await?
    }
}

fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, UreqTransportError> {
    let HttpRequest { url, parts } = request;

    let mut builder = http::Request::builder()
        .method(parts.method.as_str())
        .uri(url.as_str());
    for (name, value) in &parts.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let body = match parts.body {
        Some(HttpBody::Text(text)) => Some(text),
        Some(HttpBody::Form(entries)) => Some(
            form_urlencoded::Serializer::new(String::new())
                .extend_pairs(entries)
                .finish(),
        ),
        None => None,
    };

    let mut response = match body {
        Some(body) => run(agent, builder.body(body)?, parts.timeout)?,
        None => run(agent, builder.body(())?, parts.timeout)?,
    };

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_string()?;

    Ok(HttpResponse { status, headers, body })
}

/// The timeout is request-scoped config, so the agent's own settings and
/// connection pool stay in play.
fn run<S: AsSendBody>(
    agent: &ureq::Agent,
    request: http::Request<S>,
    timeout: Option<Duration>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let request = match timeout {
        Some(timeout) => agent
            .configure_request(request)
            .timeout_global(Some(timeout))
            .build(),
        None => request,
    };
    agent.run(request)
}
