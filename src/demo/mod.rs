//! Demo application served by the `bocchi` binary.
//!
//! A small package registry with fake data:
//!
//! ```graphql
//! type Package {
//!   scheme: String!
//!   id: String!
//!   uri: String!
//!   name: String!
//!   description: String!
//!   handles: [Package!]!
//! }
//!
//! type Query {
//!   packages: [Package!]!
//!   package(id: String!): Package
//! }
//! ```
//!
//! The `packages` resolver watches the caller's abort signal through the
//! bridged [`RequestContext`](crate::bridge::RequestContext).

mod schema;
mod types;

pub use schema::{DemoSchema, DemoState, QueryRoot, build_schema, build_schema_with};
pub use types::*;
