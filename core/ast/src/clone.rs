//! Deep copy of subtrees.
//!
//! A clone has the same shape, variants, IDs, change annotations, fixed
//! position flags and spans as its source, and shares no handles with it.
//! Side tables keyed by [`NodeRef`] are not touched; the returned
//! [`CloneMap`] lets the caller carry them over explicitly.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::errors::{AstError, AstResult};
use crate::nodes::{ChildSlot, ChildSlotMut, Node, NodeRef, Slot};

/// Mapping from source handles to the handles of their copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneMap {
    root: NodeRef,
    map: FxHashMap<NodeRef, NodeRef>,
}

impl CloneMap {
    fn new(root: NodeRef) -> Self {
        Self {
            root,
            map: FxHashMap::default(),
        }
    }

    fn insert(&mut self, source: NodeRef, copy: NodeRef, is_root: bool) {
        if is_root {
            self.root = copy;
        }
        self.map.insert(source, copy);
    }

    /// Handle of the copy of the cloned root.
    #[must_use]
    pub fn root(&self) -> NodeRef {
        self.root
    }

    #[must_use]
    pub fn get(&self, source: NodeRef) -> Option<NodeRef> {
        self.map.get(&source).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, NodeRef)> + '_ {
        self.map.iter().map(|(from, to)| (*from, *to))
    }
}

impl Arena {
    /// Copies the subtree rooted at `node` inside this arena.
    ///
    /// With `new_parent` the copy is attached there (appended when the slot
    /// is a list, stored otherwise) and keeps the source span verbatim.
    /// Without it the copy becomes a root at the source's absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::MalformedTreeAccess`] if a required child in the
    /// subtree is absent, and [`AstError::InvalidVariantState`] if `new_parent`
    /// names a slot its node does not have. Nothing is copied in either case.
    pub fn clone_subtree(
        &mut self,
        node: NodeRef,
        new_parent: Option<(NodeRef, Slot)>,
    ) -> AstResult<CloneMap> {
        let order = subtree_order(self, node)?;
        let target = match new_parent {
            Some((parent, slot)) => {
                let is_list = self.child_list(parent, slot).is_ok();
                if !is_list {
                    self.child(parent, slot)?;
                }
                Some((parent, slot, is_list))
            }
            None => None,
        };
        let mut map = CloneMap::new(NodeRef(0));
        for source in &order {
            let entry = self.get(*source)?.clone();
            let copy = self.push(entry);
            map.insert(*source, copy, *source == node);
        }
        for source in &order {
            let copy = map.get(*source).ok_or(AstError::UnknownNode(*source))?;
            relink(self, copy, &map)?;
        }
        let absolute = self.absolute_position(node)?;
        self.detach_copy_root(node, absolute, map.root)?;
        if let Some((parent, slot, is_list)) = target {
            let verbatim = self.get(node)?.span();
            if is_list {
                self.push_child(parent, slot, map.root)?;
            } else {
                self.set_child(parent, slot, Some(map.root))?;
            }
            self.node_mut(map.root)?.span = verbatim;
        }
        debug!(%node, copied = map.len(), "cloned subtree");
        Ok(map)
    }

    /// Copies the subtree rooted at `node` into a fresh arena that shares
    /// this arena's identity generator.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::MalformedTreeAccess`] if a required child in the
    /// subtree is absent.
    pub fn clone_into_new_arena(&self, node: NodeRef) -> AstResult<(Arena, CloneMap)> {
        let mut dest = Arena::with_id_generator(self.id_generator().clone());
        let map = self.copy_into(node, &mut dest)?;
        Ok((dest, map))
    }

    /// Copies the subtree rooted at `node` into `dest` as a new root.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::MalformedTreeAccess`] if a required child in the
    /// subtree is absent.
    pub fn copy_into(&self, node: NodeRef, dest: &mut Arena) -> AstResult<CloneMap> {
        let order = subtree_order(self, node)?;
        let mut map = CloneMap::new(NodeRef(0));
        for source in &order {
            let copy = dest.push(self.get(*source)?.clone());
            map.insert(*source, copy, *source == node);
        }
        for source in &order {
            let copy = map.get(*source).ok_or(AstError::UnknownNode(*source))?;
            relink(dest, copy, &map)?;
        }
        dest.detach_copy_root(node, self.absolute_position(node)?, map.root)?;
        debug!(%node, copied = map.len(), "copied subtree into another arena");
        Ok(map)
    }

    fn detach_copy_root(
        &mut self,
        source: NodeRef,
        absolute: i32,
        copy: NodeRef,
    ) -> AstResult<()> {
        let entry = self.node_mut(copy)?;
        entry.parent = None;
        entry.span.position = absolute;
        trace!(%source, %copy, "copied root detached");
        Ok(())
    }
}

/// Pre-order list of the subtree, failing on the first hole.
fn subtree_order(arena: &Arena, node: NodeRef) -> AstResult<Vec<NodeRef>> {
    let mut order = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        let children = arena.children(current)?;
        order.push(current);
        stack.extend(children.into_iter().rev());
    }
    Ok(order)
}

/// Rewrites the child handles and parent links of a freshly pushed copy.
fn relink(arena: &mut Arena, copy: NodeRef, map: &CloneMap) -> AstResult<()> {
    let entry: &mut Node = arena.node_mut(copy)?;
    for slot in entry.kind.child_slots_mut() {
        match slot {
            ChildSlotMut::Required(_, cell) | ChildSlotMut::Optional(_, cell) => {
                if let Some(child) = cell {
                    *child = map.get(*child).ok_or(AstError::UnknownNode(*child))?;
                }
            }
            ChildSlotMut::List(_, list) => {
                for child in list.iter_mut() {
                    *child = map.get(*child).ok_or(AstError::UnknownNode(*child))?;
                }
            }
        }
    }
    let children: Vec<NodeRef> = entry
        .kind
        .child_slots()
        .into_iter()
        .flat_map(|slot| match slot {
            ChildSlot::Required(_, child) | ChildSlot::Optional(_, child) => {
                child.into_iter().collect::<Vec<_>>()
            }
            ChildSlot::List(_, list) => list.to_vec(),
        })
        .collect();
    for child in children {
        arena.node_mut(child)?.parent = Some(copy);
        trace!(%copy, %child, "relinked cloned child");
    }
    Ok(())
}
