//! Route-table construction errors.
//!
//! Every variant here is a fatal configuration error raised while the route
//! table is being built at startup. Resolution never errors: a lookup miss is
//! ordinary control flow, not a failure.

use thiserror::Error;

/// Error raised by [`Router::add_route`](crate::router::Router::add_route).
///
/// Variants fall into two kinds: malformed patterns (the pattern text itself
/// is invalid) and conflicting registrations (the pattern is valid but clashes
/// with something already in the tree). Use [`RouteError::is_malformed`] and
/// [`RouteError::is_conflict`] to distinguish them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The route pattern was the empty string.
    #[error("route pattern is empty")]
    EmptyPattern,
    /// The route pattern did not start with `/`.
    #[error("route pattern must start with '/': [{0}]")]
    MissingLeadingSlash(String),
    /// The route pattern ended with `/` (and was not the root pattern `/`).
    #[error("route pattern must not end with '/': [{0}]")]
    TrailingSlash(String),
    /// The route pattern contained consecutive slashes (an empty segment).
    #[error("route pattern must not contain consecutive '/': [{0}]")]
    EmptySegment(String),
    /// A handler is already bound at exactly this pattern.
    #[error("conflicting route: duplicate registration for [{0}]")]
    DuplicateRoute(String),
    /// The pattern registers a `:param` segment where a wildcard child
    /// already exists.
    #[error("conflicting route [{0}]: wildcard already registered at this position")]
    ParamAfterWildcard(String),
    /// The pattern registers a `*` segment where a parameter child already
    /// exists.
    #[error("conflicting route [{0}]: path parameter already registered at this position")]
    WildcardAfterParam(String),
    /// The pattern registers a parameter whose name differs from the one
    /// already bound at this tree position.
    #[error("conflicting route [{pattern}]: position already bound to parameter [{existing}]")]
    ParamNameClash { pattern: String, existing: String },
}

impl RouteError {
    /// True when the pattern text itself is invalid.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RouteError::EmptyPattern
                | RouteError::MissingLeadingSlash(_)
                | RouteError::TrailingSlash(_)
                | RouteError::EmptySegment(_)
        )
    }

    /// True when the pattern is valid but clashes with an earlier
    /// registration.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        !self.is_malformed()
    }
}
