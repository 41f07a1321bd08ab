use std::sync::{Arc, Mutex};

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema};

use crate::abort::AbortSignal;
use crate::bridge::RequestContext;
use crate::config::{DemoSettings, ServerSettings};

use super::types::*;

pub type DemoSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub struct DemoState {
    pub packages: Vec<Package>,
    /// Signals that already carry an abort listener from `packages`.
    watched: Mutex<Vec<AbortSignal>>,
}

impl DemoState {
    pub fn new(packages: Vec<Package>) -> Self {
        Self {
            packages,
            watched: Mutex::new(Vec::new()),
        }
    }

    /// Log the abort of `signal` once, however many requests share it.
    ///
    /// Returns `false` when the signal was already aborted.
    fn watch(&self, signal: &AbortSignal) -> bool {
        let mut watched = self.watched.lock().unwrap_or_else(|e| e.into_inner());
        watched.retain(|s| !s.is_aborted());
        if watched.iter().any(|s| s.same_as(signal)) {
            return true;
        }

        let registered = signal.on_abort(|reason| {
            tracing::info!(reason, "packages request aborted");
        });
        if registered {
            watched.push(signal.clone());
        }
        registered
    }
}

pub fn build_schema(server: &ServerSettings, demo: &DemoSettings) -> DemoSchema {
    build_schema_with(fake_packages(demo.packages), server)
}

pub fn build_schema_with(packages: Vec<Package>, server: &ServerSettings) -> DemoSchema {
    let state = Arc::new(DemoState::new(packages));

    let mut builder = Schema::build(QueryRoot, EmptyMutation, EmptySubscription).data(state);
    if !server.introspection {
        builder = builder.disable_introspection();
    }
    if let Some(depth) = server.limit_depth {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = server.limit_complexity {
        builder = builder.limit_complexity(complexity);
    }
    builder.finish()
}

fn request_signal<'a>(ctx: &'a Context<'_>) -> Option<&'a AbortSignal> {
    ctx.data_opt::<RequestContext>()?.init.signal.as_ref()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All packages
    async fn packages(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Package>> {
        let state = ctx.data::<Arc<DemoState>>()?;

        if let Some(signal) = request_signal(ctx) {
            if !state.watch(signal) {
                tracing::warn!(reason = ?signal.reason(), "packages requested after abort");
            }
        }

        Ok(state.packages.clone())
    }

    /// Get a single package by ID
    async fn package(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<Option<Package>> {
        let state = ctx.data::<Arc<DemoState>>()?;
        Ok(state.packages.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::AbortController;
    use crate::bridge::{RequestDescriptor, RequestInit};
    use serde_json::json;

    fn request_with_signal(signal: AbortSignal) -> async_graphql::Request {
        async_graphql::Request::new("{ packages { id } }").data(RequestDescriptor::new(
            "/graphql",
            RequestInit::new("POST").with_signal(signal),
        ))
    }

    fn fixed_schema(server: &ServerSettings) -> DemoSchema {
        build_schema_with(
            vec![
                Package::new("quiet-guitar.com", "1", "first"),
                Package::new("lonely-rock.dev", "2", "second"),
            ],
            server,
        )
    }

    #[tokio::test]
    async fn test_package_lookup() {
        let schema = fixed_schema(&ServerSettings::default());

        let response = schema
            .execute(r#"{ package(id: "2") { uri name } missing: package(id: "9") { id } }"#)
            .await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({ "package": { "uri": "lr:2", "name": "lonely-rock.dev" }, "missing": null })
        );
    }

    #[tokio::test]
    async fn test_packages_without_request_context() {
        let schema = fixed_schema(&ServerSettings::default());
        let response = schema.execute("{ packages { id handles { id } } }").await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({ "packages": [{ "id": "1", "handles": [] }, { "id": "2", "handles": [] }] })
        );
    }

    #[tokio::test]
    async fn test_repeated_requests_register_one_listener_per_signal() {
        let schema = fixed_schema(&ServerSettings::default());
        let controller = AbortController::new();

        for _ in 0..3 {
            let response = schema.execute(request_with_signal(controller.signal())).await;
            assert!(response.errors.is_empty());
        }
        assert_eq!(controller.signal().listener_count(), 1);

        let other = AbortController::new();
        schema.execute(request_with_signal(other.signal())).await;
        assert_eq!(other.signal().listener_count(), 1);
        assert_eq!(controller.signal().listener_count(), 1);
    }

    #[tokio::test]
    async fn test_aborted_signal_is_not_watched() {
        let schema = fixed_schema(&ServerSettings::default());
        let controller = AbortController::new();
        controller.abort();

        let response = schema.execute(request_with_signal(controller.signal())).await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap()["packages"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
        assert_eq!(controller.signal().listener_count(), 0);
    }

    #[tokio::test]
    async fn test_depth_limit_applies() {
        let schema = fixed_schema(&ServerSettings {
            limit_depth: Some(2),
            ..Default::default()
        });
        let response = schema
            .execute("{ packages { handles { handles { id } } } }")
            .await;
        assert!(!response.errors.is_empty());
    }

    #[tokio::test]
    async fn test_introspection_can_be_disabled() {
        let schema = fixed_schema(&ServerSettings {
            introspection: false,
            ..Default::default()
        });
        let response = schema.execute("{ __schema { queryType { name } } }").await;
        assert!(!response.errors.is_empty());
    }

    #[test]
    fn test_sdl_lists_types() {
        let sdl = fixed_schema(&ServerSettings::default()).sdl();
        assert!(sdl.contains("type Package"));
        assert!(sdl.contains("packages: [Package!]!"));
    }
}
