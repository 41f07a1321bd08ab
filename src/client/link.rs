use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::{BridgeAdapter, HeaderValue, RequestDescriptor, RequestInit, ResponseDescriptor};
use crate::error::Result;
use crate::server::Executor;

pub const ACCEPT: &str = "application/graphql-response+json,application/json;q=0.9";

/// Something that can carry a fetch call and answer it.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<ResponseDescriptor>> + Send;
}

impl<E: Executor> Fetch for BridgeAdapter<E> {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor> {
        self.call(request).await
    }
}

/// One entry of a response's `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

/// The GraphQL response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
    variables: &'a Value,
    query: &'a str,
}

/// Sends operations as JSON `POST` requests through a [`Fetch`].
pub struct HttpLink<F> {
    uri: String,
    fetch: F,
}

impl<F: Fetch> HttpLink<F> {
    pub fn new(uri: impl Into<String>, fetch: F) -> Self {
        Self {
            uri: uri.into(),
            fetch,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    pub fn build_request(&self, operation: &super::Operation) -> Result<RequestDescriptor> {
        let body = serde_json::to_vec(&RequestBody {
            operation_name: operation.operation_name.as_deref(),
            variables: &operation.variables,
            query: &operation.query,
        })?;

        let mut init = RequestInit::new("POST")
            .with_header("accept", ACCEPT)
            .with_header("content-type", "application/json")
            .with_body(body);
        for (key, value) in &operation.context.headers {
            init.headers
                .push((key.clone(), Some(HeaderValue::Single(value.clone()))));
        }
        if let Some(signal) = operation.context.signal() {
            init = init.with_signal(signal.clone());
        }

        Ok(RequestDescriptor::new(self.uri.clone(), init))
    }

    pub async fn request(&self, operation: &super::Operation) -> Result<GraphQLResponse> {
        let request = self.build_request(operation)?;
        let response = self.fetch.fetch(request).await?;
        response.json()
    }
}
