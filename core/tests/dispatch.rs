//! Dispatch behaviour against an in-memory transport.
//!
//! # Design
//! `Recorder` keeps every request it is handed and replies from a queue of
//! canned responses, so each test can assert on exactly what reached the
//! wire and how the reply was classified.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Mutex;
use std::time::Duration;

use rfetch::promises::{assert_defined, delay_value_for, retry};
use rfetch::{
    BoxError, BoxFuture, Content, Error, FetchError, HttpBody, HttpMethod, HttpRequest, HttpResponse,
    Interceptor, RequestOptions, RequestParts, Rfetch, Transport, Url,
};
use serde_json::json;

#[derive(Default)]
struct Recorder {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<HttpResponse>>,
}

impl Recorder {
    fn reply(&self, status: u16, content_type: Option<&str>, body: &str) {
        self.replies.lock().unwrap().push_back(HttpResponse {
            status,
            headers: content_type
                .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: body.to_string(),
        });
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for Recorder {
    type Error = Infallible;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Infallible> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: r#"{"ok":true}"#.to_string(),
        }))
    }
}

struct Unreachable;

impl Transport for Unreachable {
    type Error = std::io::Error;

    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, std::io::Error> {
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"))
    }
}

fn client() -> Rfetch<Recorder> {
    Rfetch::new(Recorder::default())
}

fn trace(name: &'static str) -> impl Fn(&Url, RequestParts) -> Result<RequestParts, BoxError> {
    move |_url: &Url, mut parts: RequestParts| {
        let seen = parts.header("X-Trace").map(str::to_string);
        let value = match seen {
            Some(prev) => format!("{prev},{name}"),
            None => name.to_string(),
        };
        parts.set_header("X-Trace", value);
        Ok(parts)
    }
}

const URL: &str = "https://ribbonstudios.com/api";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_defaults_to_get() {
    let client = client();
    client.dispatch(URL, &RequestOptions::new()).await.unwrap();

    let req = client.transport().last();
    assert_eq!(req.url.as_str(), URL);
    assert_eq!(req.parts.method, HttpMethod::Get);
    assert!(req.parts.body.is_none());
}

#[tokio::test]
#[allow(deprecated)]
async fn shorthands_fix_the_method() {
    let client = client();
    let options = RequestOptions::new().method(HttpMethod::Post);

    client.get(URL, &options).await.unwrap();
    client.put(URL, &options).await.unwrap();
    client.post(URL, &options).await.unwrap();
    client.patch(URL, &options).await.unwrap();
    client.delete(URL, &options).await.unwrap();
    client.remove(URL, &options).await.unwrap();

    let methods: Vec<HttpMethod> = client.transport().requests().iter().map(|r| r.parts.method).collect();
    assert_eq!(
        methods,
        vec![
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Delete,
        ]
    );
}

#[tokio::test]
async fn structured_body_round_trips() {
    let client = client();
    let body = json!({ "hello": "world", "list": [1, 2, 3] });
    client.post(URL, &RequestOptions::new().json(body.clone())).await.unwrap();

    let req = client.transport().last();
    assert_eq!(req.parts.header("content-type"), Some("application/json"));
    let Some(HttpBody::Text(text)) = req.parts.body else {
        panic!("expected a text body");
    };
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), body);
}

#[tokio::test]
async fn options_are_not_mutated_by_dispatch() {
    let client = client();
    client.interceptors().add(trace("a"));
    let options = RequestOptions::new()
        .param("tags", vec!["a", "b"])
        .header("Accept", "application/json")
        .json(json!({ "a": 1 }));
    let before = options.clone();

    client.post(URL, &options).await.unwrap();
    assert_eq!(options, before);
}

// ---------------------------------------------------------------------------
// Interceptors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn interceptors_run_in_registration_order() {
    let client = client();
    client.interceptors().add(trace("a"));
    client.interceptors().add(trace("b"));

    client.get(URL, &RequestOptions::new()).await.unwrap();
    assert_eq!(client.transport().last().parts.header("X-Trace"), Some("a,b"));
}

#[tokio::test]
async fn removed_interceptors_stop_applying() {
    let client = client();
    let a = client.interceptors().add(trace("a"));
    client.interceptors().add(trace("b"));

    client.get(URL, &RequestOptions::new()).await.unwrap();
    client.interceptors().remove(&a);
    client.get(URL, &RequestOptions::new()).await.unwrap();
    client.interceptors().clear();
    client.get(URL, &RequestOptions::new()).await.unwrap();

    let traces: Vec<Option<String>> = client
        .transport()
        .requests()
        .iter()
        .map(|r| r.parts.header("X-Trace").map(str::to_string))
        .collect();
    assert_eq!(traces, vec![Some("a,b".to_string()), Some("b".to_string()), None]);
}

struct Authorize;

impl Interceptor for Authorize {
    fn intercept<'a>(
        &'a self,
        url: &'a Url,
        parts: RequestParts,
    ) -> BoxFuture<'a, Result<RequestParts, BoxError>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            if url.host_str() != Some("ribbonstudios.com") {
                return Err(BoxError::from("refusing to send credentials"));
            }
            let mut parts = parts;
            parts.set_header("Authorization", "Bearer secret");
            Ok(parts)
        })
    }
}

#[tokio::test]
async fn async_interceptors_see_the_resolved_url() {
    let client = client();
    client.interceptors().add(Authorize);

    client
        .get(URL, &RequestOptions::new().param("page", 2u32))
        .await
        .unwrap();
    let req = client.transport().last();
    assert_eq!(req.url.as_str(), "https://ribbonstudios.com/api?page=2");
    assert_eq!(req.parts.header("authorization"), Some("Bearer secret"));
}

#[tokio::test]
async fn interceptor_failure_aborts_before_sending() {
    let client = client();
    client.interceptors().add(Authorize);

    let err = client.get("https://elsewhere.example", &RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::Interceptor(_)));
    assert!(client.transport().requests().is_empty());
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn json_and_text_responses() {
    let client = client();
    client.transport().reply(200, Some("application/json; charset=utf-8"), r#"{"hello":"world"}"#);
    client.transport().reply(200, None, "hello");

    let json = client.get(URL, &RequestOptions::new()).await.unwrap();
    assert_eq!(json, Content::Json(json!({ "hello": "world" })));

    let text = client.get(URL, &RequestOptions::new()).await.unwrap();
    assert_eq!(text, Content::Text("hello".to_string()));
}

#[tokio::test]
async fn no_content_is_empty() {
    let client = client();
    client.transport().reply(204, None, "");

    let content = client.delete(URL, &RequestOptions::new()).await.unwrap();
    assert_eq!(content, Content::Empty);
}

#[tokio::test]
async fn error_status_is_a_fetch_error() {
    let client = client();
    client.transport().reply(500, Some("application/json"), r#"{"hello":"world"}"#);

    let err = client.get(URL, &RequestOptions::new()).await.unwrap_err();
    assert!(err.is_fetch_error());
    assert_eq!(
        err.as_fetch_error(),
        Some(&FetchError {
            status: 500,
            content: Content::Json(json!({ "hello": "world" })),
        })
    );
}

#[tokio::test]
async fn transport_failures_are_not_fetch_errors() {
    let client = Rfetch::new(Unreachable);
    let err = client.get(URL, &RequestOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(!err.is_fetch_error());
    assert!(err.to_string().contains("connection refused"));
}

// ---------------------------------------------------------------------------
// Composition with the future helpers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retry_recovers_from_a_failed_dispatch() {
    let client = client();
    client.transport().reply(503, None, "busy");
    client.transport().reply(200, None, "done");

    let options = RequestOptions::new();
    let content = retry(|| client.get(URL, &options), 3).await.unwrap();
    assert_eq!(content, Content::Text("done".to_string()));
    assert_eq!(client.transport().requests().len(), 2);
}

#[tokio::test]
async fn retry_surfaces_the_last_fetch_error() {
    let client = client();
    client.transport().reply(500, None, "first");
    client.transport().reply(502, None, "second");

    let options = RequestOptions::new();
    let err = retry(|| client.get(URL, &options), 2).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test(start_paused = true)]
async fn delayed_dispatch_keeps_its_value() {
    let client = client();
    let start = tokio::time::Instant::now();

    let content = delay_value_for(client.get(URL, &RequestOptions::new()), Duration::from_millis(300))
        .await
        .unwrap();
    assert_eq!(content, Content::Json(json!({ "ok": true })));
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn defined_rejects_no_content() {
    let client = client();
    client.transport().reply(204, None, "");

    let options = RequestOptions::new();
    let fetched = async { client.get(URL, &options).await.unwrap() };
    let err = assert_defined(fetched, Some("expected a body")).await.unwrap_err();
    assert!(matches!(err, Error::PredicateNotSatisfied { ref message } if message == "expected a body"));
}
