//! Queries bound to the lifetime of an owner.
//!
//! A [`QueryScope`] stands in for a mounted UI component: it is created once
//! ([`QueryScope::mount`]), issues any number of queries, and when it goes
//! away ([`QueryScope::unmount`] or drop) it aborts its default signal. Every
//! query started through [`QueryScope::use_query`] without its own context
//! carries that signal down to the resolvers.

use serde_json::Value;

use crate::abort::{AbortController, AbortSignal};
use crate::client::{Client, Fetch, FetchPolicy, ObservableQuery, QueryContext, QueryOptions};

/// Fetch policy applied when the caller does not pick one.
pub const DEFAULT_FETCH_POLICY: FetchPolicy = FetchPolicy::CacheAndNetwork;

pub const UNMOUNT_REASON: &str = "query scope unmounted";

#[derive(Debug)]
pub struct QueryScope {
    default_abort: AbortController,
}

impl QueryScope {
    pub fn mount() -> Self {
        Self {
            default_abort: AbortController::new(),
        }
    }

    /// The signal injected into queries that bring no context of their own.
    pub fn signal(&self) -> AbortSignal {
        self.default_abort.signal()
    }

    /// Start a query owned by this scope.
    ///
    /// Defaults the fetch policy to `cache-and-network`. When `options`
    /// carries no context, the scope's signal is set as
    /// `context.fetch_options.signal`; a caller-supplied context, even an
    /// empty one, is used as is and gets no signal merged in.
    pub fn use_query<F: Fetch>(
        &self,
        client: &Client<F>,
        query: impl Into<String>,
        options: Option<QueryOptions>,
    ) -> ObservableQuery<F> {
        let options = self.scoped_options(options);
        client.watch_query(query, options)
    }

    /// [`QueryScope::use_query`] with variables and nothing else.
    pub fn use_query_with_variables<F: Fetch>(
        &self,
        client: &Client<F>,
        query: impl Into<String>,
        variables: Value,
    ) -> ObservableQuery<F> {
        self.use_query(client, query, Some(QueryOptions::new().with_variables(variables)))
    }

    pub(crate) fn scoped_options(&self, options: Option<QueryOptions>) -> QueryOptions {
        let mut options = options.unwrap_or_default();
        options.fetch_policy = Some(options.fetch_policy.unwrap_or(DEFAULT_FETCH_POLICY));
        if options.context.is_none() {
            options.context = Some(QueryContext::with_signal(self.signal()));
        }
        options
    }

    /// Tear the scope down, aborting its default signal.
    pub fn unmount(self) {}
}

impl Drop for QueryScope {
    fn drop(&mut self) {
        if self.default_abort.abort_with(UNMOUNT_REASON) {
            tracing::debug!("query scope unmounted, default signal aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ErrorPolicy, FetchOptions};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults_without_options() {
        let scope = QueryScope::mount();
        let options = scope.scoped_options(None);

        assert_eq!(options.fetch_policy, Some(FetchPolicy::CacheAndNetwork));
        let signal = options.context.as_ref().and_then(QueryContext::signal).unwrap();
        assert!(signal.same_as(&scope.signal()));
        assert!(!signal.is_aborted());
    }

    #[test]
    fn test_caller_fetch_policy_kept() {
        let scope = QueryScope::mount();
        let options =
            scope.scoped_options(Some(QueryOptions::new().with_fetch_policy(FetchPolicy::CacheFirst)));
        assert_eq!(options.fetch_policy, Some(FetchPolicy::CacheFirst));
        assert!(options.context.unwrap().signal().is_some());
    }

    #[test]
    fn test_other_options_pass_through() {
        let scope = QueryScope::mount();
        let options = scope.scoped_options(Some(
            QueryOptions::new()
                .with_operation_name("Packages")
                .with_error_policy(ErrorPolicy::All)
                .skip(true),
        ));
        assert_eq!(options.operation_name.as_deref(), Some("Packages"));
        assert_eq!(options.error_policy, ErrorPolicy::All);
        assert!(options.skip);
    }

    #[test]
    fn test_empty_caller_context_suppresses_default_signal() {
        let scope = QueryScope::mount();
        let options = scope.scoped_options(Some(QueryOptions::new().with_context(QueryContext::default())));

        let context = options.context.unwrap();
        assert!(context.fetch_options.is_none());
        assert!(context.signal().is_none());
    }

    #[test]
    fn test_partial_caller_context_is_not_merged() {
        let scope = QueryScope::mount();
        let context = QueryContext {
            fetch_options: Some(FetchOptions::default()),
            headers: vec![("x-client".to_string(), "cli".to_string())],
        };
        let options = scope.scoped_options(Some(QueryOptions::new().with_context(context)));

        let context = options.context.unwrap();
        assert!(context.signal().is_none());
        assert_eq!(context.headers.len(), 1);
    }

    #[test]
    fn test_signal_stable_across_calls() {
        let scope = QueryScope::mount();
        let first = scope.scoped_options(None).context.unwrap();
        let second = scope.scoped_options(None).context.unwrap();
        assert!(first.signal().unwrap().same_as(second.signal().unwrap()));
    }

    #[test]
    fn test_unmount_aborts_exactly_once() {
        let scope = QueryScope::mount();
        let signal = scope.signal();
        let aborts = Arc::new(AtomicUsize::new(0));

        let counter = aborts.clone();
        signal.on_abort(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _ = scope.scoped_options(None);
        assert_eq!(aborts.load(Ordering::SeqCst), 0);

        scope.unmount();
        assert!(signal.is_aborted());
        assert_eq!(signal.reason().as_deref(), Some(UNMOUNT_REASON));
        assert_eq!(aborts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_aborts() {
        let signal = {
            let scope = QueryScope::mount();
            scope.signal()
        };
        assert!(signal.is_aborted());
    }
}
