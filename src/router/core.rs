//! Router core - route-table construction and the lookup hot path.

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::node::Node;
use crate::error::RouteError;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST routes have ≤4 path params; 8 keeps the common case on the stack.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` because they come from the static route tree
/// built at startup: `Arc::clone()` is an O(1) atomic increment, while values
/// stay `String` as per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully walking a request path to a tree node.
///
/// A completed walk may land on a node with no handler attached (an
/// intermediate path never registered directly). That is distinct from a
/// lookup miss: `handler_name` is `None` but the walk completed, and the
/// dispatch layer decides how to respond (it answers not-found for both).
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Name of the handler bound at the matched node, if any.
    pub handler_name: Option<Arc<str>>,
    /// Path parameters captured during the walk (empty if none).
    pub path_params: ParamVec,
    /// Query string parameters (populated by the server layer, not resolve).
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: with duplicate parameter names at
    /// different path depths, the deepest capture is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap.
    /// Note: this allocates - use get_path_param() in hot paths instead.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// HTTP request router over one segment tree per method.
///
/// The table is built incrementally at startup through [`Router::add_route`]
/// and is logically immutable afterwards: [`Router::resolve`] is a pure read
/// that never mutates the tree, allocates its parameter vector per call, and
/// is safe to run from arbitrarily many concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct Router {
    trees: HashMap<Method, Node>,
}

impl Router {
    /// Create an empty router. Routes are added with [`Router::add_route`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }

    /// Register `handler` (an opaque name resolved by the dispatcher) under
    /// `pattern` for `method`.
    ///
    /// Patterns are absolute segment paths. A segment starting with `:`
    /// captures the concrete segment under that name; a segment that is
    /// exactly `*` matches any single concrete segment without capturing.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] for malformed patterns (empty, missing leading
    /// slash, trailing slash, consecutive slashes) and for conflicting
    /// registrations (duplicate pattern, or a parameter/wildcard clash at one
    /// tree position). All of these are fatal configuration errors: the
    /// application must not start serving with a malformed route table.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: &str,
    ) -> Result<(), RouteError> {
        if pattern.is_empty() {
            return Err(RouteError::EmptyPattern);
        }
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(pattern.to_string()));
        }
        if pattern != "/" && pattern.ends_with('/') {
            return Err(RouteError::TrailingSlash(pattern.to_string()));
        }
        // Reject empty interior segments before touching the tree so a failed
        // registration leaves no partial structure behind.
        if pattern.len() > 1 && pattern[1..].split('/').any(str::is_empty) {
            return Err(RouteError::EmptySegment(pattern.to_string()));
        }

        let root = self.trees.entry(method.clone()).or_insert_with(Node::root);

        if pattern == "/" {
            if root.handler.is_some() {
                return Err(RouteError::DuplicateRoute("/".to_string()));
            }
            root.handler = Some(Arc::from(handler));
            info!(method = %method, pattern = %pattern, handler = %handler, "route registered");
            return Ok(());
        }

        let mut current = root;
        for seg in pattern[1..].split('/') {
            current = current.child_or_create(seg, pattern)?;
        }
        if current.handler.is_some() {
            return Err(RouteError::DuplicateRoute(pattern.to_string()));
        }
        current.handler = Some(Arc::from(handler));

        info!(method = %method, pattern = %pattern, handler = %handler, "route registered");
        Ok(())
    }

    /// Resolve a concrete request path against the tree for `method`.
    ///
    /// Returns `None` when no tree exists for the method or the walk dead-ends.
    /// Returns `Some` for every completed walk, including onto a node with no
    /// handler (see [`RouteMatch`]).
    ///
    /// Traversal takes the first matching branch per the static > parameter >
    /// wildcard priority and never backtracks across siblings. A wildcard
    /// consumes exactly one segment; deeper path segments need corresponding
    /// structure beneath the wildcard node.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let root = match self.trees.get(method) {
            Some(root) => root,
            None => {
                debug!(method = %method, path = %path, "no route tree for method");
                return None;
            }
        };

        if path == "/" {
            return Some(RouteMatch {
                handler_name: root.handler.clone(),
                path_params: ParamVec::new(),
                query_params: ParamVec::new(),
            });
        }

        let mut params = ParamVec::new();
        let mut current = root;
        for seg in path.trim_matches('/').split('/') {
            let (child, is_param) = match current.child_of(seg) {
                Some(hit) => hit,
                None => {
                    debug!(method = %method, path = %path, segment = %seg, "no route matched");
                    return None;
                }
            };
            if is_param {
                if let Some(name) = &child.param_name {
                    params.push((Arc::clone(name), seg.to_string()));
                }
            }
            current = child;
        }

        debug!(
            method = %method,
            path = %path,
            handler = ?current.handler,
            params = ?params,
            "route matched"
        );
        Some(RouteMatch {
            handler_name: current.handler.clone(),
            path_params: params,
            query_params: ParamVec::new(),
        })
    }
}
