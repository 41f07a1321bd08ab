use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::abort::AbortSignal;
use crate::error::Result;

use super::cache::CacheKey;
use super::link::GraphQLError;

/// Where a query may take its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Serve from the cache; go to the network only on a miss.
    #[default]
    CacheFirst,
    /// Serve cached data immediately, then always revalidate.
    CacheAndNetwork,
    /// Always go to the network; still write the result to the cache.
    NetworkOnly,
    /// Never go to the network.
    CacheOnly,
    /// Always go to the network and leave the cache alone.
    NoCache,
}

impl FetchPolicy {
    pub(crate) fn reads_cache(self) -> bool {
        matches!(
            self,
            FetchPolicy::CacheFirst | FetchPolicy::CacheAndNetwork | FetchPolicy::CacheOnly
        )
    }

    pub(crate) fn writes_cache(self) -> bool {
        self != FetchPolicy::NoCache
    }
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchPolicy::CacheFirst => "cache-first",
            FetchPolicy::CacheAndNetwork => "cache-and-network",
            FetchPolicy::NetworkOnly => "network-only",
            FetchPolicy::CacheOnly => "cache-only",
            FetchPolicy::NoCache => "no-cache",
        };
        f.write_str(name)
    }
}

/// What to do with GraphQL errors in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Errors replace the data.
    #[default]
    None,
    /// Errors are dropped, data is kept.
    Ignore,
    /// Both data and errors are returned.
    All,
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub signal: Option<AbortSignal>,
}

/// Per-operation context handed to the link.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    pub fetch_options: Option<FetchOptions>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl QueryContext {
    pub fn with_signal(signal: AbortSignal) -> Self {
        Self {
            fetch_options: Some(FetchOptions {
                signal: Some(signal),
            }),
            ..Default::default()
        }
    }

    pub fn signal(&self) -> Option<&AbortSignal> {
        self.fetch_options.as_ref()?.signal.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub variables: Option<Value>,
    pub operation_name: Option<String>,
    pub fetch_policy: Option<FetchPolicy>,
    pub error_policy: ErrorPolicy,
    pub context: Option<QueryContext>,
    pub skip: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = Some(policy);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_context(mut self, context: QueryContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

/// A query document with everything the link needs to send it.
#[derive(Debug, Clone)]
pub struct Operation {
    pub query: String,
    pub variables: Value,
    pub operation_name: Option<String>,
    pub context: QueryContext,
}

impl Operation {
    pub fn new(query: impl Into<String>, options: &QueryOptions) -> Self {
        Self {
            query: query.into(),
            variables: match &options.variables {
                Some(Value::Null) | None => Value::Object(Default::default()),
                Some(vars) => vars.clone(),
            },
            operation_name: options.operation_name.clone(),
            context: options.context.clone().unwrap_or_default(),
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.query, self.operation_name.as_deref(), &self.variables)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Loading,
    Refetch,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum QueryError {
    #[error("GraphQL error: {}", join_messages(.0))]
    #[serde(rename = "graphql")]
    GraphQL(Vec<GraphQLError>),

    #[error("Network error: {0}")]
    Network(String),
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// State of a query as seen by its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub data: Option<Value>,
    pub error: Option<QueryError>,
    pub loading: bool,
    pub network_status: NetworkStatus,
}

impl QueryResult {
    pub fn loading(data: Option<Value>) -> Self {
        Self {
            data,
            error: None,
            loading: true,
            network_status: NetworkStatus::Loading,
        }
    }

    pub fn ready(data: Option<Value>) -> Self {
        Self {
            data,
            error: None,
            loading: false,
            network_status: NetworkStatus::Ready,
        }
    }

    pub fn failed(error: QueryError, data: Option<Value>) -> Self {
        Self {
            data,
            error: Some(error),
            loading: false,
            network_status: NetworkStatus::Error,
        }
    }

    /// Deserialize `data` into a typed value.
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.data {
            Some(data) => Ok(Some(serde_json::from_value(data.clone())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_policy_serde_names() {
        let policy: FetchPolicy = serde_json::from_value(json!("cache-and-network")).unwrap();
        assert_eq!(policy, FetchPolicy::CacheAndNetwork);
        assert_eq!(policy.to_string(), "cache-and-network");
        assert_eq!(FetchPolicy::default(), FetchPolicy::CacheFirst);
    }

    #[test]
    fn test_null_variables_normalized() {
        let a = Operation::new("{ a }", &QueryOptions::new());
        let b = Operation::new("{ a }", &QueryOptions::new().with_variables(Value::Null));
        assert_eq!(a.variables, json!({}));
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_context_signal_lookup() {
        assert!(QueryContext::default().signal().is_none());

        let controller = crate::abort::AbortController::new();
        let context = QueryContext::with_signal(controller.signal());
        assert!(context.signal().unwrap().same_as(&controller.signal()));
    }

    #[test]
    fn test_parse_data() {
        #[derive(Deserialize)]
        struct Data {
            answer: u32,
        }

        let result = QueryResult::ready(Some(json!({ "answer": 42 })));
        let data: Data = result.parse_data().unwrap().unwrap();
        assert_eq!(data.answer, 42);

        assert!(QueryResult::ready(None).parse_data::<Data>().unwrap().is_none());
    }

    #[test]
    fn test_query_error_display() {
        let error = QueryError::GraphQL(vec![
            GraphQLError::new("first"),
            GraphQLError::new("second"),
        ]);
        assert_eq!(error.to_string(), "GraphQL error: first; second");
    }
}
