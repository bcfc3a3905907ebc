use std::sync::Arc;

use tracing::trace;

use crate::change::{ChangeInfo, ChangeType};
use crate::errors::{AstError, AstResult};
use crate::ids::IdGenerator;
use crate::nodes::{ChildSlot, ChildSlotMut, Node, NodeKind, NodeRef, Slot, Span};

/// Owns every node of one or more trees.
///
/// Nodes are addressed by [`NodeRef`]. Parent links are plain handles and
/// carry no ownership; a tree is dropped by dropping its arena.
#[derive(Clone, Debug)]
pub struct Arena {
    pub(crate) nodes: Vec<Node>,
    ids: Arc<IdGenerator>,
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

impl Arena {
    /// Creates an empty arena with its own identity generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(IdGenerator::default()))
    }

    /// Creates an empty arena drawing IDs from `ids`.
    #[must_use]
    pub fn with_id_generator(ids: Arc<IdGenerator>) -> Self {
        Self {
            nodes: Vec::new(),
            ids,
        }
    }

    #[must_use]
    pub fn id_generator(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a node with a fresh ID.
    ///
    /// Children already present in `kind` are attached to the new node
    /// (detaching them from any previous owner). Required slots may be left
    /// empty here and filled later with [`Arena::set_child`].
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] if a child handle is unknown or is
    /// listed twice.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> AstResult<NodeRef> {
        let id = self.ids.next_id();
        self.alloc_with_id(id, kind, span)
    }

    pub(crate) fn alloc_with_id(
        &mut self,
        id: u32,
        kind: NodeKind,
        span: Span,
    ) -> AstResult<NodeRef> {
        let name = kind.name();
        let mut children = Vec::new();
        for slot in kind.child_slots() {
            match slot {
                ChildSlot::Required(slot, Some(child))
                | ChildSlot::Optional(slot, Some(child)) => children.push((slot, child)),
                ChildSlot::List(slot, list) => {
                    children.extend(list.iter().map(|child| (slot, *child)));
                }
                ChildSlot::Required(..) | ChildSlot::Optional(..) => {}
            }
        }
        for (index, (slot, child)) in children.iter().enumerate() {
            self.get(*child).map_err(|_| AstError::InvalidChild {
                kind: name,
                slot: *slot,
                reason: "child is not a node of this arena",
            })?;
            if children[..index].iter().any(|(_, seen)| seen == child) {
                return Err(AstError::InvalidChild {
                    kind: name,
                    slot: *slot,
                    reason: "the same node appears twice among the children",
                });
            }
        }

        let node = self.push(Node {
            id,
            span,
            parent: None,
            kind,
            change: ChangeInfo::default(),
            fixed_position: false,
        });
        for (_, child) in children {
            self.unlink(child)?;
            self.link(node, child)?;
        }
        trace!(%node, id, kind = name, "allocated node");
        Ok(node)
    }

    /// Pushes a node verbatim, without touching any other node.
    pub(crate) fn push(&mut self, node: Node) -> NodeRef {
        // Arenas beyond u32::MAX nodes are not supported.
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(node);
        NodeRef(index)
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn get(&self, node: NodeRef) -> AstResult<&Node> {
        self.nodes.get(node.index()).ok_or(AstError::UnknownNode(node))
    }

    /// Mutable access to the change annotations and the fixed-position flag.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn node_mut(&mut self, node: NodeRef) -> AstResult<&mut Node> {
        self.nodes
            .get_mut(node.index())
            .ok_or(AstError::UnknownNode(node))
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn kind(&self, node: NodeRef) -> AstResult<&NodeKind> {
        Ok(&self.get(node)?.kind)
    }

    /// Raw payload access that bypasses the ownership protocol.
    ///
    /// Child handles written through this reference are neither validated
    /// nor re-parented, and required slots may be emptied. Intended for
    /// parser back-ends that fix up links themselves.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn kind_mut_unchecked(&mut self, node: NodeRef) -> AstResult<&mut NodeKind> {
        Ok(&mut self.node_mut(node)?.kind)
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn parent(&self, node: NodeRef) -> AstResult<Option<NodeRef>> {
        Ok(self.get(node)?.parent)
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn id(&self, node: NodeRef) -> AstResult<u32> {
        Ok(self.get(node)?.id)
    }

    /// Handles of all nodes without a parent, in allocation order.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.handles()
            .filter(|handle| self.nodes[handle.index()].parent.is_none())
    }

    /// Every handle of this arena, in allocation order.
    pub fn handles(&self) -> impl Iterator<Item = NodeRef> + use<> {
        let len = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        (0..len).map(NodeRef)
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn set_change(&mut self, node: NodeRef, change: ChangeType) -> AstResult<()> {
        self.node_mut(node)?.change.change = change;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn set_change_noprop(&mut self, node: NodeRef, change: ChangeType) -> AstResult<()> {
        self.node_mut(node)?.change.change_noprop = change;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn set_moved(&mut self, node: NodeRef, moved: bool) -> AstResult<()> {
        self.node_mut(node)?.change.moved = moved;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn set_fixed_position(&mut self, node: NodeRef, fixed: bool) -> AstResult<()> {
        self.node_mut(node)?.fixed_position = fixed;
        Ok(())
    }

    /// Assigns a span verbatim. For an attached node `span.position` is
    /// taken as parent-relative.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn set_span(&mut self, node: NodeRef, span: Span) -> AstResult<()> {
        self.node_mut(node)?.span = span;
        Ok(())
    }

    /// Absolute source offset of `node`, summing relative positions up to
    /// the root.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn absolute_position(&self, node: NodeRef) -> AstResult<i32> {
        let mut position = 0;
        let mut current = Some(node);
        while let Some(handle) = current {
            let entry = self.get(handle)?;
            position += entry.span.position;
            current = entry.parent;
        }
        Ok(position)
    }

    /// Absolute `(start, end)` of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn absolute_bounds(&self, node: NodeRef) -> AstResult<(i32, i32)> {
        let start = self.absolute_position(node)?;
        Ok((start, start + self.get(node)?.span.length))
    }

    /// `true` if `ancestor` is `node` or lies on its parent chain.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a handle outside this arena.
    pub fn is_ancestor(&self, ancestor: NodeRef, node: NodeRef) -> AstResult<bool> {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return Ok(true);
            }
            current = self.get(handle)?.parent;
        }
        Ok(false)
    }

    /// Children of `node` in traversal order.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::MalformedTreeAccess`] if a required child is
    /// absent and [`AstError::UnknownNode`] for a foreign handle.
    pub fn children(&self, node: NodeRef) -> AstResult<Vec<NodeRef>> {
        let kind = self.kind(node)?;
        let mut children = Vec::new();
        for slot in kind.child_slots() {
            match slot {
                ChildSlot::Required(slot, None) => {
                    return Err(AstError::MalformedTreeAccess {
                        kind: kind.name(),
                        node,
                        slot,
                    });
                }
                ChildSlot::Required(_, Some(child)) | ChildSlot::Optional(_, Some(child)) => {
                    children.push(child);
                }
                ChildSlot::Optional(_, None) => {}
                ChildSlot::List(_, list) => children.extend_from_slice(list),
            }
        }
        Ok(children)
    }

    /// Content of a single-child slot.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if `slot` is not a
    /// single-child slot of this node's kind.
    pub fn child(&self, node: NodeRef, slot: Slot) -> AstResult<Option<NodeRef>> {
        let kind = self.kind(node)?;
        kind.child_slots()
            .into_iter()
            .find_map(|entry| match entry {
                ChildSlot::Required(s, child) | ChildSlot::Optional(s, child) if s == slot => {
                    Some(child)
                }
                _ => None,
            })
            .ok_or_else(|| no_such_slot(kind.name(), slot))
    }

    /// Content of a single-child slot that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::MalformedTreeAccess`] if the slot is empty.
    pub fn required_child(&self, node: NodeRef, slot: Slot) -> AstResult<NodeRef> {
        self.child(node, slot)?
            .ok_or_else(|| AstError::MalformedTreeAccess {
                kind: self.nodes[node.index()].kind.name(),
                node,
                slot,
            })
    }

    /// Content of a list slot.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if `slot` is not a list slot
    /// of this node's kind.
    pub fn child_list(&self, node: NodeRef, slot: Slot) -> AstResult<&[NodeRef]> {
        let kind = self.kind(node)?;
        kind.child_slots()
            .into_iter()
            .find_map(|entry| match entry {
                ChildSlot::List(s, list) if s == slot => Some(list),
                _ => None,
            })
            .ok_or_else(|| no_such_slot(kind.name(), slot))
    }

    /// Stores `child` in a single-child slot of `owner` and returns the
    /// previous occupant, which is left detached.
    ///
    /// `child` is first detached from wherever it currently hangs. Passing
    /// `None` clears an optional slot.
    ///
    /// # Errors
    ///
    /// - [`AstError::InvalidChild`] if the slot is required and `child` is
    ///   `None`, if `child` is `owner` or one of its ancestors, or if
    ///   `child` is unknown.
    /// - [`AstError::InvalidVariantState`] if `slot` is not a single-child
    ///   slot of `owner`'s kind.
    pub fn set_child(
        &mut self,
        owner: NodeRef,
        slot: Slot,
        child: Option<NodeRef>,
    ) -> AstResult<Option<NodeRef>> {
        let name = self.kind(owner)?.name();
        let required = self.slot_is_required(owner, slot)?;
        let Some(child) = child else {
            if required {
                return Err(AstError::InvalidChild {
                    kind: name,
                    slot,
                    reason: "required child is absent",
                });
            }
            let previous = self.replace_single(owner, slot, None)?;
            if let Some(previous) = previous {
                self.orphan(previous)?;
            }
            return Ok(previous);
        };

        self.check_attachable(owner, slot, child)?;
        if self.child(owner, slot)? == Some(child) {
            return Ok(None);
        }
        self.unlink(child)?;
        let previous = self.replace_single(owner, slot, Some(child))?;
        if let Some(previous) = previous {
            self.orphan(previous)?;
        }
        self.link(owner, child)?;
        self.after_child_set(owner, slot)?;
        Ok(previous)
    }

    /// Appends `child` to a list slot of `owner`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Arena::set_child`], with `slot` required to be a
    /// list slot.
    pub fn push_child(&mut self, owner: NodeRef, slot: Slot, child: NodeRef) -> AstResult<()> {
        self.check_attachable(owner, slot, child)?;
        // Validate the slot before unlinking so a bad call has no effect.
        self.child_list(owner, slot)?;
        self.unlink(child)?;
        self.list_mut(owner, slot)?.push(child);
        self.link(owner, child)
    }

    /// Replaces the content of a list slot, detaching the old entries.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Arena::push_child`] for every entry, plus
    /// [`AstError::InvalidChild`] if a node is listed twice. All entries are
    /// checked before anything changes, so a rejected call leaves the tree
    /// as it was.
    pub fn set_child_list(
        &mut self,
        owner: NodeRef,
        slot: Slot,
        children: &[NodeRef],
    ) -> AstResult<()> {
        let previous = self.child_list(owner, slot)?.to_vec();
        for (index, child) in children.iter().enumerate() {
            self.check_attachable(owner, slot, *child)?;
            if children[..index].contains(child) {
                return Err(AstError::InvalidChild {
                    kind: self.kind(owner)?.name(),
                    slot,
                    reason: "the same node appears twice among the children",
                });
            }
        }
        self.list_mut(owner, slot)?.clear();
        for old in previous {
            self.orphan(old)?;
        }
        for child in children {
            self.push_child(owner, slot, *child)?;
        }
        Ok(())
    }

    /// Removes `node` from its parent and returns the slot it occupied.
    ///
    /// Detaching from a required slot leaves a hole the caller must fill
    /// before the tree is cloned, walked or serialized.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a foreign handle.
    pub fn detach(&mut self, node: NodeRef) -> AstResult<Option<(NodeRef, Slot)>> {
        let Some(parent) = self.parent(node)? else {
            return Ok(None);
        };
        let slot = self.unlink(node)?;
        Ok(slot.map(|slot| (parent, slot)))
    }

    fn slot_is_required(&self, owner: NodeRef, slot: Slot) -> AstResult<bool> {
        let kind = self.kind(owner)?;
        kind.child_slots()
            .into_iter()
            .find_map(|entry| match entry {
                ChildSlot::Required(s, _) if s == slot => Some(true),
                ChildSlot::Optional(s, _) if s == slot => Some(false),
                _ => None,
            })
            .ok_or_else(|| no_such_slot(kind.name(), slot))
    }

    fn check_attachable(&self, owner: NodeRef, slot: Slot, child: NodeRef) -> AstResult<()> {
        let name = self.kind(owner)?.name();
        if self.get(child).is_err() {
            return Err(AstError::InvalidChild {
                kind: name,
                slot,
                reason: "child is not a node of this arena",
            });
        }
        if self.is_ancestor(child, owner)? {
            return Err(AstError::InvalidChild {
                kind: name,
                slot,
                reason: "attaching the node would create a cycle",
            });
        }
        Ok(())
    }

    fn replace_single(
        &mut self,
        owner: NodeRef,
        slot: Slot,
        child: Option<NodeRef>,
    ) -> AstResult<Option<NodeRef>> {
        let name = self.kind(owner)?.name();
        let kind = self.kind_mut_unchecked(owner)?;
        for entry in kind.child_slots_mut() {
            match entry {
                ChildSlotMut::Required(s, cell) | ChildSlotMut::Optional(s, cell) if s == slot => {
                    return Ok(std::mem::replace(cell, child));
                }
                _ => {}
            }
        }
        Err(no_such_slot(name, slot))
    }

    fn list_mut(&mut self, owner: NodeRef, slot: Slot) -> AstResult<&mut Vec<NodeRef>> {
        let name = self.kind(owner)?.name();
        let kind = self.kind_mut_unchecked(owner)?;
        kind.child_slots_mut()
            .into_iter()
            .find_map(|entry| match entry {
                ChildSlotMut::List(s, list) if s == slot => Some(list),
                _ => None,
            })
            .ok_or_else(|| no_such_slot(name, slot))
    }

    /// Records `owner` as the parent of the detached `child` and rebases the
    /// child's position to be owner-relative.
    fn link(&mut self, owner: NodeRef, child: NodeRef) -> AstResult<()> {
        let base = self.absolute_position(owner)?;
        let entry = self.node_mut(child)?;
        entry.span.position -= base;
        entry.parent = Some(owner);
        trace!(%owner, %child, "attached child");
        Ok(())
    }

    /// Removes `child` from its parent's slot (if any) and makes it a root.
    fn unlink(&mut self, child: NodeRef) -> AstResult<Option<Slot>> {
        let Some(parent) = self.parent(child)? else {
            return Ok(None);
        };
        let mut removed = None;
        for entry in self.kind_mut_unchecked(parent)?.child_slots_mut() {
            match entry {
                ChildSlotMut::Required(slot, cell) | ChildSlotMut::Optional(slot, cell)
                    if *cell == Some(child) =>
                {
                    *cell = None;
                    removed = Some(slot);
                    break;
                }
                ChildSlotMut::List(slot, list) => {
                    if let Some(index) = list.iter().position(|entry| *entry == child) {
                        list.remove(index);
                        removed = Some(slot);
                        break;
                    }
                }
                _ => {}
            }
        }
        self.orphan(child)?;
        trace!(%parent, %child, "detached child");
        Ok(removed)
    }

    /// Clears the parent link of a node no longer referenced by its parent,
    /// converting its position back to absolute.
    fn orphan(&mut self, node: NodeRef) -> AstResult<()> {
        let absolute = self.absolute_position(node)?;
        let entry = self.node_mut(node)?;
        entry.span.position = absolute;
        entry.parent = None;
        Ok(())
    }
}

fn no_such_slot(kind: &'static str, slot: Slot) -> AstError {
    AstError::InvalidVariantState {
        kind,
        reason: format!("no `{slot}` slot of that shape"),
    }
}
