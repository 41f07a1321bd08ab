use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::abort::AbortSignal;
use crate::error::Result;

/// A header value as a fetch caller hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Many(Vec<String>),
}

impl HeaderValue {
    /// Collapse to one string, list values joined with `", "`.
    pub fn joined(&self) -> String {
        match self {
            HeaderValue::Single(value) => value.clone(),
            HeaderValue::Many(values) => values.join(", "),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Many(values)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        HeaderValue::Many(values.into_iter().map(String::from).collect())
    }
}

/// Options of an outbound fetch call.
///
/// A header entry with a `None` value is carried but ignored when the
/// headers are flattened.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: String,
    pub headers: Vec<(String, Option<HeaderValue>)>,
    pub body: Option<Vec<u8>>,
    pub signal: Option<AbortSignal>,
}

impl RequestInit {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.push((key.into(), Some(value.into())));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// A fetch call: where it goes and how.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub target: String,
    pub init: RequestInit,
}

impl RequestDescriptor {
    pub fn new(target: impl Into<String>, init: RequestInit) -> Self {
        Self {
            target: target.into(),
            init,
        }
    }
}

/// The original fetch call, visible to resolvers through
/// `ctx.data::<RequestContext>()`.
pub type RequestContext = RequestDescriptor;

/// What the bridge hands back to the caller in place of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseDescriptor {
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ResponseDescriptor {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Metadata of the HTTP request the executor pretends to serve.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpMeta {
    pub body: Value,
    pub headers: BTreeMap<String, String>,
    pub method: String,
    pub search: String,
}

/// One execution request, built per bridged call and dropped after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorInput {
    pub query: Option<Value>,
    pub variables: Option<Value>,
    pub operation_name: Option<Value>,
    pub http: HttpMeta,
}
