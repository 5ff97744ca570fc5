//! Segment-tree node storage and child-selection policy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RouteError;

/// One path-segment position in a method's route tree.
///
/// A node stores the literal text of its segment (`"/"` for the method root,
/// otherwise the raw segment including any leading `:`), the handler bound
/// exactly here (if any), and three kinds of children:
///
/// - static children, keyed by exact segment text,
/// - at most one parameter child (segment starts with `:`),
/// - at most one wildcard child (segment is exactly `*`).
///
/// The parameter and wildcard children are mutually exclusive: once a node
/// has one, registering the other is a conflict. Static children coexist
/// freely with either.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Raw segment text of this tree position (e.g. `"user"`, `":id"`, `"*"`).
    pub(crate) segment: String,
    /// Handler name bound at exactly this node, if a pattern ends here.
    pub(crate) handler: Option<Arc<str>>,
    /// Parameter name without the leading `:`, present only on param nodes.
    ///
    /// Stored as `Arc<str>` so resolution can record captures with an O(1)
    /// clone instead of copying the name per request.
    pub(crate) param_name: Option<Arc<str>>,
    /// Children matched by exact segment text.
    pub(crate) static_children: HashMap<String, Node>,
    /// Child capturing any single segment under a name (`:id`).
    pub(crate) param_child: Option<Box<Node>>,
    /// Child matching any single segment without capturing (`*`).
    pub(crate) wildcard_child: Option<Box<Node>>,
}

impl Node {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            handler: None,
            param_name: segment.strip_prefix(':').map(Arc::from),
            static_children: HashMap::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Root node of a method tree.
    pub(crate) fn root() -> Self {
        Node::new("/")
    }

    /// Return the child for `seg`, creating it if absent. Registration only.
    ///
    /// `pattern` is the full pattern being registered and is used solely for
    /// error reporting.
    pub(crate) fn child_or_create(
        &mut self,
        seg: &str,
        pattern: &str,
    ) -> Result<&mut Node, RouteError> {
        if seg.starts_with(':') {
            if self.wildcard_child.is_some() {
                return Err(RouteError::ParamAfterWildcard(pattern.to_string()));
            }
            if let Some(existing) = &self.param_child {
                if existing.segment != seg {
                    return Err(RouteError::ParamNameClash {
                        pattern: pattern.to_string(),
                        existing: existing.segment.clone(),
                    });
                }
            }
            return Ok(self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new(seg))));
        }
        if seg == "*" {
            if self.param_child.is_some() {
                return Err(RouteError::WildcardAfterParam(pattern.to_string()));
            }
            return Ok(self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::new(seg))));
        }
        Ok(self
            .static_children
            .entry(seg.to_string())
            .or_insert_with(|| Node::new(seg)))
    }

    /// Select the child matching a concrete path segment. Resolution only.
    ///
    /// Priority is a deliberate tie-break: an exact static match always beats
    /// the parameter child, and the parameter child always beats the wildcard
    /// child. The boolean is true when the parameter child matched, telling
    /// the caller to record a capture.
    pub(crate) fn child_of(&self, seg: &str) -> Option<(&Node, bool)> {
        if let Some(child) = self.static_children.get(seg) {
            return Some((child, false));
        }
        if let Some(child) = self.param_child.as_deref() {
            return Some((child, true));
        }
        self.wildcard_child.as_deref().map(|child| (child, false))
    }
}
