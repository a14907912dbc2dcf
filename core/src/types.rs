//! Caller-facing request and response values.
//!
//! # Design
//! `RequestOptions` is the unresolved request descriptor: a bag of optional
//! pieces that `Rfetch::build_request` turns into an `HttpRequest`. The body
//! is an explicit tagged variant so "text that is already JSON" and "a value
//! to serialize" can never be confused.

use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::http::HttpMethod;

/// Strategy for serializing a multi-valued query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// One entry, values joined with `,`: `?id=1,2`.
    Comma,
    /// One entry per value: `?id=1&id=2`.
    #[default]
    Duplicate,
}

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" => Ok(Delimiter::Comma),
            "duplicate" => Ok(Delimiter::Duplicate),
            _ => Err(Error::InvalidDelimiter(s.to_string())),
        }
    }
}

/// A query parameter value. `None` entries are nullish and never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(Option<String>),
    List(Vec<Option<String>>),
}

impl ParamValue {
    /// The non-nullish values, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Scalar(value) => value.as_deref().into_iter().collect(),
            ParamValue::List(values) => values.iter().filter_map(Option::as_deref).collect(),
        }
    }
}

macro_rules! scalar_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Scalar(Some(value.to_string()))
                }
            }

            impl From<Option<$ty>> for ParamValue {
                fn from(value: Option<$ty>) -> Self {
                    ParamValue::Scalar(value.map(|v| v.to_string()))
                }
            }

            impl From<Vec<$ty>> for ParamValue {
                fn from(values: Vec<$ty>) -> Self {
                    ParamValue::List(values.into_iter().map(|v| Some(v.to_string())).collect())
                }
            }

            impl From<Vec<Option<$ty>>> for ParamValue {
                fn from(values: Vec<Option<$ty>>) -> Self {
                    ParamValue::List(values.into_iter().map(|v| v.map(|v| v.to_string())).collect())
                }
            }
        )*
    };
}

scalar_param!(&str, String, bool, i32, i64, u32, u64, usize, f64);

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ParamValue::List(items.into_iter().map(json_scalar).collect()),
            other => ParamValue::Scalar(json_scalar(other)),
        }
    }
}

/// Natural string form of a JSON value; `null` is nullish. Floats use
/// `f64`'s `Display`, so `1.0` reads as `1`.
fn json_scalar(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

/// The body handed to `Rfetch`. Ignored for GET requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Already serialized text, sent as-is with a JSON content type.
    Raw(String),
    /// Form entries, sent url-encoded with the form-encoded content type.
    /// Text fields only: `multipart/form-data` and file uploads are not
    /// supported.
    Form(Vec<(String, String)>),
    /// A value serialized to JSON at build time.
    Structured(Value),
}

/// Per-call request descriptor.
///
/// ```
/// use rfetch::{HttpMethod, RequestOptions};
///
/// let options = RequestOptions::new()
///     .method(HttpMethod::Post)
///     .param("tag", vec!["a", "b"])
///     .header("Authorization", "Bearer abc")
///     .json(serde_json::json!({ "hello": "world" }));
/// assert_eq!(options.params.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub params: Vec<(String, ParamValue)>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn json(self, value: Value) -> Self {
        self.body(RequestBody::Structured(value))
    }

    /// Serialize any `Serialize` value into a structured body.
    pub fn json_from<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(value).map_err(Error::Serialize)?;
        Ok(self.json(value))
    }

    pub fn raw(self, text: impl Into<String>) -> Self {
        self.body(RequestBody::Raw(text.into()))
    }

    pub fn form<K, V>(self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.body(RequestBody::Form(entries))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A successfully classified response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Json(Value),
    Text(String),
    /// The response carried no content (204).
    Empty,
}

impl Content {
    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Content::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Deserialize into `T`. Text is parsed as JSON; `Empty` reads as `null`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self {
            Content::Json(value) => serde_json::from_value(value),
            Content::Text(text) => serde_json::from_str(&text),
            Content::Empty => serde_json::from_value(Value::Null),
        }
        .map_err(Error::Deserialize)
    }
}
