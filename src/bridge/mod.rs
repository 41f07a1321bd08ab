//! The fetch-shaped seam between the client and the local server.
//!
//! The client believes it is doing an HTTP `POST`; the [`BridgeAdapter`]
//! turns that call into an [`ExecutorInput`], runs it on the in-process
//! server and answers with a [`ResponseDescriptor`].
//!
//! Resolvers can reach the original call through the [`RequestContext`]
//! request data, which is how they observe the caller's abort signal:
//!
//! ```ignore
//! async fn packages(&self, ctx: &Context<'_>) -> Vec<Package> {
//!     if let Some(signal) = ctx.data_opt::<RequestContext>().and_then(|r| r.init.signal.as_ref()) {
//!         if signal.is_aborted() { return Vec::new(); }
//!     }
//!     // ...
//! }
//! ```

mod adapter;
mod types;

pub use adapter::{BridgeAdapter, flatten_headers, normalize};
pub use types::*;
