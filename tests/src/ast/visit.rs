use jsdelta_ast::{
    arena::Arena,
    errors::AstError,
    nodes::{NodeRef, Slot},
    token::Token,
    visit::{Visitor, Walk, walk},
};

use crate::utils::{function, span, while_in_block};

struct Counter {
    seen: usize,
}

impl Visitor for Counter {
    fn visit(&mut self, _: &Arena, _: NodeRef) -> Walk {
        self.seen += 1;
        Walk::Descend
    }
}

#[test]
fn test_pre_order_follows_child_slots() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    assert_eq!(
        arena.pre_order(tree.outer)?,
        vec![
            tree.outer,
            tree.while_loop,
            tree.x,
            tree.inner,
            tree.statement,
            tree.y
        ]
    );
    Ok(())
}

#[test]
fn test_function_children_order() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    let name = arena.child(node, Slot::Name)?.unwrap();
    let params = arena.child_list(node, Slot::Params)?.to_vec();
    let body = arena.required_child(node, Slot::Body)?;
    let ret = arena.child_list(body, Slot::Statements)?[0];
    let value = arena.child(ret, Slot::Value)?.unwrap();
    assert_eq!(
        arena.pre_order(node)?,
        vec![node, name, params[0], body, ret, value]
    );
    Ok(())
}

#[test]
fn test_visits_every_node_once() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    let mut counter = Counter { seen: 0 };
    assert!(walk(&arena, tree.outer, &mut counter)?);
    assert_eq!(counter.seen, arena.len());
    Ok(())
}

#[test]
fn test_skip_children_prunes_subtree() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    let mut seen = Vec::new();
    let completed = walk(&arena, tree.outer, &mut |_: &Arena, node: NodeRef| {
        seen.push(node);
        if node == tree.while_loop {
            Walk::SkipChildren
        } else {
            Walk::Descend
        }
    })?;
    assert!(completed);
    assert_eq!(seen, vec![tree.outer, tree.while_loop]);
    Ok(())
}

#[test]
fn test_halt_stops_whole_walk() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let x = arena.name("x", span(0, 1))?;
    let y = arena.name("y", span(4, 1))?;
    let z = arena.name("z", span(8, 1))?;
    let first = arena.infix(Token::Add, x, y, 2)?;
    let sum = arena.infix(Token::Add, first, z, 6)?;
    let mut seen = Vec::new();
    let completed = walk(&arena, sum, &mut |_: &Arena, node: NodeRef| {
        seen.push(node);
        if node == x { Walk::Halt } else { Walk::Descend }
    })?;
    assert!(!completed);
    assert_eq!(seen, vec![sum, first, x]);
    Ok(())
}

#[test]
fn test_walk_reports_hole() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    arena.detach(tree.inner)?;
    let mut counter = Counter { seen: 0 };
    let err = walk(&arena, tree.outer, &mut counter).unwrap_err();
    assert!(matches!(
        err,
        AstError::MalformedTreeAccess {
            slot: Slot::Body,
            ..
        }
    ));
    assert_eq!(counter.seen, 2);
    Ok(())
}

#[test]
fn test_leaf_walk_visits_only_itself() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let leaf = arena.empty(span(0, 0))?;
    assert_eq!(arena.pre_order(leaf)?, vec![leaf]);
    Ok(())
}
