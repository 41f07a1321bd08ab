use std::sync::Arc;

use crate::bridge::BridgeAdapter;
use crate::client::{Client, HttpLink, InMemoryCache};
use crate::config::ClientSettings;
use crate::server::{Executor, GraphQLServer};

/// Client type produced by [`make_bocchi`] for an executor `E`.
pub type BocchiClient<E> = Client<BridgeAdapter<E>>;

/// A local server and a client wired to it.
pub struct Bocchi<E> {
    pub server: Arc<GraphQLServer<E>>,
    pub client: BocchiClient<E>,
    pub cache: Arc<InMemoryCache>,
}

impl<E: Executor> Bocchi<E> {
    pub fn with_config(schema: E, settings: &ClientSettings) -> Self {
        let server = Arc::new(GraphQLServer::new(schema));
        let cache = Arc::new(InMemoryCache::new());
        let link = HttpLink::new(settings.uri.clone(), BridgeAdapter::new(server.clone()));
        let client =
            Client::with_default_fetch_policy(link, cache.clone(), settings.default_fetch_policy);

        tracing::debug!(uri = %settings.uri, "bocchi client wired to local server");
        Self {
            server,
            client,
            cache,
        }
    }
}

/// Wire a client to an in-process server for `schema`, with default
/// client settings.
///
/// ```no_run
/// use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
///
/// struct Query;
///
/// #[Object]
/// impl Query {
///     async fn answer(&self) -> i32 { 42 }
/// }
///
/// # async fn run() {
/// let bocchi = bocchi::make_bocchi(Schema::new(Query, EmptyMutation, EmptySubscription));
/// let result = bocchi.client.query("{ answer }", Default::default()).await;
/// assert_eq!(result.data, Some(serde_json::json!({ "answer": 42 })));
/// # }
/// ```
pub fn make_bocchi<E: Executor>(schema: E) -> Bocchi<E> {
    Bocchi::with_config(schema, &ClientSettings::default())
}
