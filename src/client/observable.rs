use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::link::Fetch;
use super::options::{ErrorPolicy, FetchPolicy, NetworkStatus, Operation, QueryResult};
use super::Client;

/// A live query: the latest [`QueryResult`] plus the means to wait for the
/// next one.
///
/// Dropping the handle stops observing but does not cancel an in-flight
/// fetch; its result still lands in the cache.
///
/// Only the most recently started fetch may publish or write the cache. A
/// slower fetch that a refetch superseded is discarded when it finishes.
pub struct ObservableQuery<F> {
    client: Client<F>,
    operation: Operation,
    fetch_policy: FetchPolicy,
    error_policy: ErrorPolicy,
    sender: Arc<watch::Sender<QueryResult>>,
    receiver: watch::Receiver<QueryResult>,
    latest_fetch: Arc<AtomicU64>,
}

impl<F: Fetch> ObservableQuery<F> {
    pub(super) fn new(
        client: Client<F>,
        operation: Operation,
        fetch_policy: FetchPolicy,
        error_policy: ErrorPolicy,
        initial: QueryResult,
    ) -> Self {
        let (sender, receiver) = watch::channel(initial);
        Self {
            client,
            operation,
            fetch_policy,
            error_policy,
            sender: Arc::new(sender),
            receiver,
            latest_fetch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        self.fetch_policy
    }

    /// The latest state.
    pub fn result(&self) -> QueryResult {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change and return it.
    pub async fn changed(&mut self) -> QueryResult {
        if self.receiver.changed().await.is_err() {
            return self.result();
        }
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until the query is no longer loading.
    pub async fn settled(&mut self) -> QueryResult {
        let settled = self
            .receiver
            .wait_for(|result| !result.loading)
            .await
            .map(|result| result.clone());
        settled.unwrap_or_else(|_| self.result())
    }

    /// Re-run the query against the network, keeping the current data
    /// visible while the refetch is in flight.
    pub fn refetch(&self) {
        let policy = match self.fetch_policy {
            FetchPolicy::NoCache => FetchPolicy::NoCache,
            _ => FetchPolicy::NetworkOnly,
        };
        // Supersede in-flight fetches before showing the loading state.
        let fetch_id = self.next_fetch_id();
        self.sender.send_modify(|result| {
            result.loading = true;
            result.error = None;
            result.network_status = NetworkStatus::Refetch;
        });
        self.spawn_fetch(policy, fetch_id);
    }

    pub(super) fn start(&self, policy: FetchPolicy) {
        let fetch_id = self.next_fetch_id();
        self.spawn_fetch(policy, fetch_id);
    }

    fn next_fetch_id(&self) -> u64 {
        self.latest_fetch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn spawn_fetch(&self, policy: FetchPolicy, fetch_id: u64) {
        let client = self.client.clone();
        let operation = self.operation.clone();
        let error_policy = self.error_policy;
        let sender = self.sender.clone();
        let latest_fetch = self.latest_fetch.clone();

        tokio::spawn(async move {
            let (result, cacheable) = client.fetch_response(&operation, error_policy).await;

            // Checked under the channel's lock so a newer fetch cannot
            // publish in between.
            sender.send_if_modified(move |current| {
                if latest_fetch.load(Ordering::SeqCst) != fetch_id {
                    tracing::debug!(fetch_id, "discarding superseded fetch result");
                    return false;
                }
                if let Some(data) = cacheable {
                    client.write_cache(&operation, policy, data);
                }
                *current = result;
                true
            });
        });
    }
}
