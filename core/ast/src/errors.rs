//! Error types for the AST crate.
//!
//! Every failure here is a caller contract violation detected at the
//! mutation or access site. None of them are retried; they propagate to
//! the caller unmodified.

use thiserror::Error;

use crate::nodes::{NodeRef, Slot};

/// Errors raised by tree construction, mutation, cloning, traversal and
/// serialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// A required child was set to an absent value, or the supplied child
    /// cannot be attached (it would create a cycle, or it is the owner).
    #[error("invalid child for `{kind}` slot `{slot}`: {reason}")]
    InvalidChild {
        kind: &'static str,
        slot: Slot,
        reason: &'static str,
    },

    /// The operation is not valid for the node's current kind.
    #[error("invalid operation on `{kind}`: {reason}")]
    InvalidVariantState { kind: &'static str, reason: String },

    /// A required child is absent in a tree that was left inconsistent.
    #[error("malformed tree: `{kind}` node {node} has no `{slot}`")]
    MalformedTreeAccess {
        kind: &'static str,
        node: NodeRef,
        slot: Slot,
    },

    /// The handle does not address a node of this arena.
    #[error("unknown node {0}")]
    UnknownNode(NodeRef),
}

pub type AstResult<T> = Result<T, AstError>;
