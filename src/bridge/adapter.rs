use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{BocchiError, Result};
use crate::server::{Executor, GraphQLServer};

use super::types::*;

/// A fetch implementation that never leaves the process.
///
/// Each call is translated into an [`ExecutorInput`], run against the local
/// [`GraphQLServer`], and the rendered result is returned as a
/// [`ResponseDescriptor`].
pub struct BridgeAdapter<E> {
    server: Arc<GraphQLServer<E>>,
}

impl<E> Clone for BridgeAdapter<E> {
    fn clone(&self) -> Self {
        Self {
            server: self.server.clone(),
        }
    }
}

impl<E: Executor> BridgeAdapter<E> {
    pub fn new(server: Arc<GraphQLServer<E>>) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &Arc<GraphQLServer<E>> {
        &self.server
    }

    /// Run one fetch call against the local server.
    ///
    /// Fails only when the body cannot be read as JSON or is `null`. The server's status
    /// code is dropped; the abort signal is passed to resolvers untouched.
    pub async fn call(&self, request: RequestDescriptor) -> Result<ResponseDescriptor> {
        tracing::debug!(
            target_url = %request.target,
            method = %request.init.method,
            "bridging request"
        );

        let input = normalize(&request).inspect_err(|e| {
            tracing::warn!(target_url = %request.target, error = %e, "unreadable request body");
        })?;

        let response = self
            .server
            .execute_http(input, move || request)
            .await;

        tracing::debug!(status = response.status, bytes = response.body.len(), "bridged response");
        Ok(ResponseDescriptor {
            body: response.body,
            headers: response.headers,
        })
    }
}

/// Parse the body and flatten the headers of a fetch call.
pub fn normalize(request: &RequestDescriptor) -> Result<ExecutorInput> {
    let raw = request.init.body.clone().ok_or(BocchiError::MissingBody)?;
    let text = String::from_utf8(raw)?;
    let body: Value = serde_json::from_str(&text)?;
    if body.is_null() {
        return Err(BocchiError::NullBody);
    }

    Ok(ExecutorInput {
        query: body.get("query").cloned(),
        variables: body.get("variables").cloned(),
        operation_name: body.get("operationName").cloned(),
        http: HttpMeta {
            headers: flatten_headers(&request.init.headers),
            method: request.init.method.clone(),
            search: String::new(),
            body,
        },
    })
}

/// Flatten fetch headers into one string per key.
///
/// List values are joined with `", "`, entries without a value are skipped
/// and a repeated key keeps its last value.
pub fn flatten_headers(headers: &[(String, Option<HeaderValue>)]) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (key, value) in headers {
        if let Some(value) = value {
            flat.insert(key.clone(), value.joined());
        }
    }
    flat
}
