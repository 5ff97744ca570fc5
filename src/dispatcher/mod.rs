//! # Dispatcher Module
//!
//! Coroutine-based request handler dispatch.
//!
//! ## Overview
//!
//! The dispatcher owns the mapping from handler names (the opaque references
//! stored in the route tree) to running handler coroutines:
//!
//! - Each handler runs in its own `may` coroutine, pre-spawned at
//!   registration time.
//! - Requests are sent to handlers via MPSC channels; each request carries a
//!   one-shot reply channel for its response.
//! - Handler panics are caught and become 500 responses; a dead handler
//!   coroutine becomes a 503 instead of a dropped connection.
//!
//! Stack size for handler coroutines is configurable via the
//! `TREELINE_STACK_SIZE` environment variable (see
//! [`crate::runtime_config`]).
//!
//! ## Handler Registration
//!
//! ```rust,ignore
//! use treeline::dispatcher::{Dispatcher, HandlerResponse};
//!
//! let mut dispatcher = Dispatcher::new();
//! unsafe {
//!     dispatcher.register_handler("get_order", |req| {
//!         let id = req.get_path_param("id").unwrap_or("?").to_string();
//!         let _ = req
//!             .reply_tx
//!             .send(HandlerResponse::json(200, serde_json::json!({ "id": id })));
//!     });
//! }
//! ```

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, SetCookie,
    MAX_INLINE_HEADERS,
};
