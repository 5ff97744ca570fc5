//! # treeline
//!
//! **treeline** is a compact, coroutine-powered HTTP router for Rust: one
//! segment trie per HTTP method, a channel-based handler dispatcher, and a
//! thin server layer over [`may_minihttp`].
//!
//! ## Architecture
//!
//! - **[`router`]** - per-method segment trees; pattern registration with
//!   conflict detection and O(k) path resolution with parameter capture
//! - **[`dispatcher`]** - coroutine-based handler dispatch over `may`
//!   channels, with panic recovery
//! - **[`server`]** - request parsing, response writing, and the
//!   `HttpService` glue that drives resolve → dispatch per request
//! - **[`error`]** - typed route-table configuration errors
//! - **[`ids`]** - ULID request ids for log correlation
//! - **[`runtime_config`]** - environment-driven coroutine tuning
//!
//! ## Route patterns
//!
//! Patterns are absolute paths whose segments are matched per tree level
//! with a fixed priority:
//!
//! | Segment | Example | Matches |
//! |---------|-----------|---------|
//! | static | `/order/detail` | exactly `detail`; always wins |
//! | parameter | `/order/:id` | any one segment, captured as `id` |
//! | wildcard | `/order/*` | any one segment, captured nowhere |
//!
//! A wildcard consumes a single segment per tree level - it is not a
//! catch-all for the rest of the path. Registering a parameter and a
//! wildcard at the same position is a startup error, as is registering the
//! same pattern twice.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treeline::dispatcher::HandlerResponse;
//! use treeline::server::{AppService, HttpServer};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut app = AppService::new();
//! app.get("/orders/:id", "get_order", |req| {
//!     let id = req.get_path_param("id").unwrap_or("?").to_string();
//!     let _ = req
//!         .reply_tx
//!         .send(HandlerResponse::json(200, serde_json::json!({ "id": id })));
//! })?;
//!
//! let handle = HttpServer(app).start("0.0.0.0:8080")?;
//! handle.join().ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! treeline runs on the `may` coroutine runtime, not tokio or async-std:
//! handlers are plain `Fn(HandlerRequest)` closures executing in lightweight
//! coroutines, blocking operations should use `may`'s facilities, and the
//! per-handler stack size is tunable via `TREELINE_STACK_SIZE`.
//!
//! The route table is built once at startup; resolution is a pure read over
//! the shared tree and is safe from arbitrarily many concurrent workers.

pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, SetCookie};
pub use error::RouteError;
pub use router::{RouteMatch, Router};
pub use server::{AppService, HttpServer, ServerHandle};
