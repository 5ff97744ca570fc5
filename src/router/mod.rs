//! # Router Module
//!
//! Path matching and route resolution over per-method segment trees.
//!
//! ## Overview
//!
//! The router owns one prefix tree per HTTP method. Registration splits a
//! pattern such as `/users/:id` into segments and grows the tree in place;
//! resolution walks the tree segment by segment, extracting parameter
//! captures along the way.
//!
//! Three segment kinds exist at each tree position, matched in priority
//! order:
//!
//! 1. **Static** (`users`) - exact text match, always wins.
//! 2. **Parameter** (`:id`) - matches any single segment and captures it
//!    under the name.
//! 3. **Wildcard** (`*`) - matches any single segment without capturing.
//!
//! A parameter and a wildcard are mutually exclusive at one position;
//! registering both is a configuration error surfaced at startup.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use treeline::router::Router;
//!
//! # fn main() -> Result<(), treeline::RouteError> {
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/users/:id", "get_user")?;
//!
//! let m = router.resolve(&Method::GET, "/users/123").unwrap();
//! assert_eq!(m.handler_name.as_deref(), Some("get_user"));
//! assert_eq!(m.get_path_param("id"), Some("123"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! Lookup is O(k) in the number of path segments, not the number of routes,
//! and the per-call parameter vector stays stack-allocated for routes with
//! ≤8 captures.

mod core;
mod node;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
