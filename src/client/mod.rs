//! GraphQL client talking through a [`Fetch`].
//!
//! The client owns an [`HttpLink`] that turns operations into fetch calls and
//! an [`InMemoryCache`] of whole results. Queries run either once
//! ([`Client::query`]) or as an [`ObservableQuery`] whose state changes as
//! cached and network results arrive ([`Client::watch_query`]).

mod cache;
mod link;
mod observable;
mod options;

pub use cache::{CacheKey, InMemoryCache};
pub use link::{ACCEPT, Fetch, GraphQLError, GraphQLResponse, HttpLink};
pub use observable::ObservableQuery;
pub use options::*;

use std::sync::Arc;

struct ClientInner<F> {
    link: HttpLink<F>,
    cache: Arc<InMemoryCache>,
    default_fetch_policy: FetchPolicy,
}

pub struct Client<F> {
    inner: Arc<ClientInner<F>>,
}

impl<F> Clone for Client<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: Fetch> Client<F> {
    pub fn new(link: HttpLink<F>, cache: Arc<InMemoryCache>) -> Self {
        Self::with_default_fetch_policy(link, cache, FetchPolicy::default())
    }

    pub fn with_default_fetch_policy(
        link: HttpLink<F>,
        cache: Arc<InMemoryCache>,
        default_fetch_policy: FetchPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                link,
                cache,
                default_fetch_policy,
            }),
        }
    }

    pub fn cache(&self) -> &Arc<InMemoryCache> {
        &self.inner.cache
    }

    pub fn link(&self) -> &HttpLink<F> {
        &self.inner.link
    }

    pub fn default_fetch_policy(&self) -> FetchPolicy {
        self.inner.default_fetch_policy
    }

    /// Run a query once and return its settled result.
    ///
    /// `cache-and-network` behaves like `network-only` here since there is
    /// nobody to show the intermediate cached state to.
    pub async fn query(&self, query: impl Into<String>, options: QueryOptions) -> QueryResult {
        let operation = Operation::new(query, &options);
        if options.skip {
            return QueryResult::ready(None);
        }

        let policy = options.fetch_policy.unwrap_or(self.inner.default_fetch_policy);
        let cached = self.read_cache(&operation, policy);
        match (policy, cached) {
            (FetchPolicy::CacheOnly, cached) => QueryResult::ready(cached),
            (FetchPolicy::CacheFirst, Some(data)) => QueryResult::ready(Some(data)),
            _ => {
                self.fetch_network(&operation, policy, options.error_policy)
                    .await
            }
        }
    }

    /// Start a query and observe it.
    ///
    /// The first state is available immediately. Network work happens on a
    /// spawned task, so this must be called from within a Tokio runtime.
    pub fn watch_query(&self, query: impl Into<String>, options: QueryOptions) -> ObservableQuery<F> {
        let operation = Operation::new(query, &options);
        let policy = options.fetch_policy.unwrap_or(self.inner.default_fetch_policy);

        if options.skip {
            return ObservableQuery::new(
                self.clone(),
                operation,
                policy,
                options.error_policy,
                QueryResult::ready(None),
            );
        }

        let cached = self.read_cache(&operation, policy);
        let needs_network = match policy {
            FetchPolicy::CacheFirst => cached.is_none(),
            FetchPolicy::CacheOnly => false,
            FetchPolicy::CacheAndNetwork | FetchPolicy::NetworkOnly | FetchPolicy::NoCache => true,
        };
        tracing::debug!(
            %policy,
            cached = cached.is_some(),
            needs_network,
            "watching query"
        );

        let initial = if needs_network {
            QueryResult::loading(cached)
        } else {
            QueryResult::ready(cached)
        };
        let observable =
            ObservableQuery::new(self.clone(), operation, policy, options.error_policy, initial);
        if needs_network {
            observable.start(policy);
        }
        observable
    }

    fn read_cache(&self, operation: &Operation, policy: FetchPolicy) -> Option<serde_json::Value> {
        if policy.reads_cache() {
            self.inner.cache.read(&operation.cache_key())
        } else {
            None
        }
    }

    pub(crate) async fn fetch_network(
        &self,
        operation: &Operation,
        policy: FetchPolicy,
        error_policy: ErrorPolicy,
    ) -> QueryResult {
        let (result, cacheable) = self.fetch_response(operation, error_policy).await;
        if let Some(data) = cacheable {
            self.write_cache(operation, policy, data);
        }
        result
    }

    /// Run the operation over the link without touching the cache.
    ///
    /// Returns the result and, when it carries no GraphQL errors, the data
    /// that may be cached.
    pub(crate) async fn fetch_response(
        &self,
        operation: &Operation,
        error_policy: ErrorPolicy,
    ) -> (QueryResult, Option<serde_json::Value>) {
        let response = match self.inner.link.request(operation).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "query failed before reaching the server");
                return (QueryResult::failed(QueryError::Network(e.to_string()), None), None);
            }
        };

        if response.errors.is_empty() {
            let cacheable = response.data.clone();
            return (QueryResult::ready(response.data), cacheable);
        }

        tracing::debug!(errors = response.errors.len(), "query returned GraphQL errors");
        let result = match error_policy {
            ErrorPolicy::None => QueryResult::failed(QueryError::GraphQL(response.errors), None),
            ErrorPolicy::Ignore => QueryResult::ready(response.data),
            ErrorPolicy::All => {
                QueryResult::failed(QueryError::GraphQL(response.errors), response.data)
            }
        };
        (result, None)
    }

    pub(crate) fn write_cache(
        &self,
        operation: &Operation,
        policy: FetchPolicy,
        data: serde_json::Value,
    ) {
        if policy.writes_cache() {
            self.inner.cache.write(operation.cache_key(), data);
        }
    }
}
