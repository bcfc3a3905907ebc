//! Pre-order traversal.
//!
//! The visitor sees a node before its children, which come in the order
//! given by [`crate::nodes::NodeKind::child_slots`]. Its return value decides
//! whether the walk descends, skips the node's children, or stops.

use tracing::trace;

use crate::arena::Arena;
use crate::errors::AstResult;
use crate::nodes::NodeRef;

/// Signal returned by a [`Visitor`] for each node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Walk {
    /// Visit the children of this node.
    Descend,
    /// Do not visit the children of this node; continue with its siblings.
    SkipChildren,
    /// Terminate the whole walk.
    Halt,
}

pub trait Visitor {
    fn visit(&mut self, arena: &Arena, node: NodeRef) -> Walk;
}

impl<F> Visitor for F
where
    F: FnMut(&Arena, NodeRef) -> Walk,
{
    fn visit(&mut self, arena: &Arena, node: NodeRef) -> Walk {
        self(arena, node)
    }
}

/// Walks the subtree rooted at `root` in pre-order.
///
/// Returns `Ok(false)` if the visitor halted the walk and `Ok(true)` if it
/// ran to completion.
///
/// # Errors
///
/// Returns [`crate::errors::AstError::MalformedTreeAccess`] when the walk
/// descends into a node with an absent required child. Nodes visited before
/// that point have already been seen by the visitor.
pub fn walk<V: Visitor + ?Sized>(arena: &Arena, root: NodeRef, visitor: &mut V) -> AstResult<bool> {
    arena.get(root)?;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        trace!(%node, "visiting");
        match visitor.visit(arena, node) {
            Walk::Halt => return Ok(false),
            Walk::SkipChildren => {}
            Walk::Descend => {
                let children = arena.children(node)?;
                stack.extend(children.into_iter().rev());
            }
        }
    }
    Ok(true)
}

impl Arena {
    /// All nodes of the subtree rooted at `root`, in pre-order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AstError::MalformedTreeAccess`] if a
    /// required child is absent.
    pub fn pre_order(&self, root: NodeRef) -> AstResult<Vec<NodeRef>> {
        let mut nodes = Vec::new();
        walk(self, root, &mut |_: &Arena, node: NodeRef| {
            nodes.push(node);
            Walk::Descend
        })?;
        Ok(nodes)
    }
}
