//! HTTP-shaped execution on top of an async-graphql schema.
//!
//! [`GraphQLServer::execute_http`] behaves like the request handler of a
//! GraphQL-over-HTTP server, minus the socket: it takes an already parsed
//! [`ExecutorInput`], validates it the way such a server validates an HTTP
//! request, executes it and renders the response body and headers.
//! Request-level problems become `400`/`405` responses with an error
//! envelope instead of Rust errors.

mod executor;

pub use executor::Executor;

use std::collections::BTreeMap;

use async_graphql::{Request, Variables};
use serde_json::{Value, json};

use crate::bridge::{ExecutorInput, RequestContext};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Rendered result of one HTTP-shaped execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGraphQLResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpGraphQLResponse {
    fn error(status: u16, message: &str) -> Self {
        let body = json!({
            "errors": [{
                "message": message,
                "extensions": { "code": "BAD_REQUEST" },
            }]
        });
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());
        Self {
            status,
            headers,
            body: body.to_string(),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self::error(400, message)
    }

    fn method_not_allowed() -> Self {
        let mut response = Self::error(405, "GraphQL requests must use GET or POST.");
        response
            .headers
            .insert("allow".to_string(), "GET, POST".to_string());
        response
    }
}

/// Validated operation parameters.
#[derive(Debug, PartialEq)]
struct GraphQLParams {
    query: String,
    variables: Value,
    operation_name: Option<String>,
}

impl GraphQLParams {
    fn from_post(input: &ExecutorInput) -> Result<Self, &'static str> {
        if !input.http.body.is_object() {
            return Err("POST body must be a JSON object.");
        }

        let query = match &input.query {
            Some(Value::String(query)) if !query.is_empty() => query.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err("GraphQL operations must contain a non-empty `query`.");
            }
            Some(_) => return Err("`query` in a POST body must be a string."),
        };

        let variables = match &input.variables {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(vars @ Value::Object(_)) => vars.clone(),
            Some(_) => return Err("`variables` in a POST body should be provided as an object."),
        };

        let operation_name = match &input.operation_name {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => return Err("`operationName` in a POST body must be a string if provided."),
        };

        Ok(Self {
            query,
            variables,
            operation_name,
        })
    }

    fn from_search(search: &str) -> Result<Self, &'static str> {
        let mut query = None;
        let mut variables = None;
        let mut operation_name = None;

        for (key, value) in url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        {
            match &*key {
                "query" => query = Some(value.into_owned()),
                "variables" => variables = Some(value.into_owned()),
                "operationName" => operation_name = Some(value.into_owned()),
                _ => {}
            }
        }

        let query = query
            .filter(|q| !q.is_empty())
            .ok_or("GraphQL operations must contain a non-empty `query`.")?;
        let variables = match variables {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(vars @ Value::Object(_)) => vars,
                _ => return Err("`variables` in a GET request must be a JSON object."),
            },
            None => Value::Object(Default::default()),
        };

        Ok(Self {
            query,
            variables,
            operation_name,
        })
    }
}

/// A schema plus the HTTP-shaped request handling around it.
pub struct GraphQLServer<E> {
    executor: E,
}

impl<E: Executor> GraphQLServer<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn sdl(&self) -> String {
        self.executor.sdl()
    }

    /// Execute one request.
    ///
    /// `context` is invoked once the request passed validation; its value is
    /// attached to the execution as request data.
    pub async fn execute_http<F>(&self, input: ExecutorInput, context: F) -> HttpGraphQLResponse
    where
        F: FnOnce() -> RequestContext + Send,
    {
        let params = match input.http.method.to_ascii_uppercase().as_str() {
            "POST" => GraphQLParams::from_post(&input),
            "GET" => GraphQLParams::from_search(&input.http.search),
            other => {
                tracing::debug!(method = other, "rejecting unsupported method");
                return HttpGraphQLResponse::method_not_allowed();
            }
        };
        let params = match params {
            Ok(params) => params,
            Err(message) => {
                tracing::debug!(reason = message, "rejecting malformed GraphQL request");
                return HttpGraphQLResponse::bad_request(message);
            }
        };

        let mut request =
            Request::new(params.query).variables(Variables::from_json(params.variables));
        if let Some(name) = params.operation_name {
            request = request.operation_name(name);
        }
        let request = request.data(context());

        let response = self.executor.execute_request(request).await;
        if response.is_err() {
            tracing::debug!(errors = response.errors.len(), "operation finished with errors");
        }

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());
        for (name, value) in response.http_headers.iter() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        match serde_json::to_string(&response) {
            Ok(body) => HttpGraphQLResponse {
                status: 200,
                headers,
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize GraphQL response");
                HttpGraphQLResponse::error(500, "Failed to serialize GraphQL response.")
            }
        }
    }
}
