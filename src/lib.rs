//! # Bocchi - GraphQL without the network
//!
//! Bocchi wires a GraphQL client to an in-process async-graphql server. The
//! client still speaks "HTTP": it builds fetch-shaped requests, but instead
//! of a socket they go through a bridge that runs them on the local schema
//! and hands back a fetch-shaped response.
//!
//! ## Features
//!
//! - **In-process transport**: [`bridge::BridgeAdapter`] turns fetch calls into executions
//! - **Client**: fetch policies, error policies and a whole-result cache
//! - **Scoped queries**: [`scope::QueryScope`] aborts its queries' signal when it goes away
//! - **Request context**: resolvers see the original call, abort signal included
//!
//! ## Quick Start
//!
//! ```no_run
//! use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
//! use bocchi::{QueryScope, make_bocchi};
//!
//! struct Query;
//!
//! #[Object]
//! impl Query {
//!     async fn greeting(&self) -> String { "hello".to_string() }
//! }
//!
//! # async fn run() {
//! let bocchi = make_bocchi(Schema::new(Query, EmptyMutation, EmptySubscription));
//!
//! let scope = QueryScope::mount();
//! let mut greeting = scope.use_query(&bocchi.client, "{ greeting }", None);
//! let result = greeting.settled().await;
//! assert_eq!(result.data, Some(serde_json::json!({ "greeting": "hello" })));
//! scope.unmount();
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`abort`]: Cooperative cancellation signals
//! - [`bridge`]: Fetch-to-executor adapter and the request/response descriptors
//! - [`server`]: HTTP-shaped execution over an async-graphql schema
//! - [`client`]: GraphQL client, link and cache
//! - [`scope`]: Queries tied to an owner's lifetime
//! - [`config`]: Configuration loading
//! - [`demo`]: Demo package registry used by the CLI

pub mod abort;

/// Fetch-to-executor adapter.
///
/// Translates fetch-shaped requests into executions on the local server.
pub mod bridge;

/// Construction entry point.
pub mod bocchi;

/// Command-line interface definitions using clap.
pub mod cli;

/// GraphQL client.
///
/// Link, cache, fetch policies and observable queries.
pub mod client;

/// Configuration loading and management.
///
/// Handles `.bocchi.toml` configuration files and their discovery.
pub mod config;

/// Demo schema with fake package data.
pub mod demo;

/// Error types and result aliases.
///
/// Defines `BocchiError` enum and `Result<T>` type alias.
pub mod error;

pub mod logging;
pub mod scope;
pub mod server;

pub use bocchi::{Bocchi, BocchiClient, make_bocchi};
pub use error::{BocchiError, Result};
pub use scope::QueryScope;
