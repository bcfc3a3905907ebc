use std::sync::Arc;

use jsdelta_ast::{
    analysis::{AnalysisTable, NoAnalysis},
    arena::Arena,
    change::{ChangeInfo, ChangeType},
    config::ExportOptions,
    errors::AstError,
    nodes::{NodeKind, Slot},
    serialize::{to_external, to_json_string},
};
use serde_json::json;

use crate::utils::{conditional, function, init_tracing, span, while_in_block};

#[test]
fn test_mutating_clone_leaves_source_intact() -> anyhow::Result<()> {
    init_tracing();
    let mut arena = Arena::new();
    let tree = conditional(&mut arena)?;
    let map = arena.clone_subtree(tree.conditional, None)?;
    let copy = map.root();

    let d = arena.name("d", span(4, 1))?;
    arena.set_child(copy, Slot::Consequent, Some(d))?;

    assert_eq!(arena.child(tree.conditional, Slot::Consequent)?, Some(tree.b));
    assert_eq!(arena.parent(tree.b)?, Some(tree.conditional));
    let source = to_external(&arena, tree.conditional, &NoAnalysis)?;
    assert_eq!(source["consequent"]["name"], json!("b"));
    let cloned = to_external(&arena, copy, &NoAnalysis)?;
    assert_eq!(cloned["consequent"]["name"], json!("d"));
    Ok(())
}

#[test]
fn test_clone_is_isomorphic_and_disjoint() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    arena.node_mut(tree.while_loop)?.change =
        ChangeInfo::new(ChangeType::Updated, ChangeType::Unchanged, true);
    arena.set_fixed_position(tree.x, true)?;

    let source_nodes = arena.pre_order(tree.outer)?;
    let map = arena.clone_subtree(tree.outer, None)?;
    let copy_nodes = arena.pre_order(map.root())?;

    assert_eq!(map.len(), source_nodes.len());
    assert_eq!(copy_nodes.len(), source_nodes.len());
    for (source, copy) in source_nodes.iter().zip(&copy_nodes) {
        assert_ne!(source, copy);
        assert_eq!(map.get(*source), Some(*copy));
        let (source, copy) = (arena.get(*source)?, arena.get(*copy)?);
        assert_eq!(source.id(), copy.id());
        assert_eq!(source.change, copy.change);
        assert_eq!(source.fixed_position, copy.fixed_position);
        assert_eq!(source.span(), copy.span());
        assert_eq!(source.kind().name(), copy.kind().name());
    }
    for copy in &copy_nodes[1..] {
        assert!(copy_nodes.contains(&arena.parent(*copy)?.unwrap()));
    }
    assert_eq!(arena.parent(map.root())?, None);

    let options = ExportOptions::default();
    assert_eq!(
        to_json_string(&arena, tree.outer, &NoAnalysis, options)?,
        to_json_string(&arena, map.root(), &NoAnalysis, options)?
    );
    Ok(())
}

#[test]
fn test_clone_into_parent_list_keeps_span() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    let map = arena.clone_subtree(tree.statement, Some((tree.inner, Slot::Statements)))?;
    let copy = map.root();
    assert_eq!(
        arena.child_list(tree.inner, Slot::Statements)?,
        &[tree.statement, copy]
    );
    assert_eq!(arena.parent(copy)?, Some(tree.inner));
    assert_eq!(arena.get(copy)?.span(), arena.get(tree.statement)?.span());
    Ok(())
}

#[test]
fn test_clone_into_single_slot_displaces_occupant() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = conditional(&mut arena)?;
    let map = arena.clone_subtree(tree.a, Some((tree.conditional, Slot::Alternate)))?;
    assert_eq!(arena.child(tree.conditional, Slot::Alternate)?, Some(map.root()));
    assert_eq!(arena.parent(tree.c)?, None);
    assert_eq!(arena.id(map.root())?, arena.id(tree.a)?);
    Ok(())
}

#[test]
fn test_clone_keeps_absent_optional_children_absent() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let ret = arena.return_statement(None, span(0, 7))?;
    let map = arena.clone_subtree(ret, None)?;
    assert_eq!(arena.child(map.root(), Slot::Value)?, None);
    assert_eq!(map.len(), 1);
    Ok(())
}

#[test]
fn test_clone_of_malformed_tree_copies_nothing() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    arena.detach(tree.y)?;
    let before = arena.len();
    let err = arena.clone_subtree(tree.outer, None).unwrap_err();
    assert!(matches!(
        err,
        AstError::MalformedTreeAccess {
            slot: Slot::Expression,
            ..
        }
    ));
    assert_eq!(arena.len(), before);
    Ok(())
}

#[test]
fn test_clone_into_new_arena_shares_generator() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    let body = arena.required_child(node, Slot::Body)?;
    let (copy_arena, map) = arena.clone_into_new_arena(body)?;

    assert!(Arc::ptr_eq(arena.id_generator(), copy_arena.id_generator()));
    assert_eq!(copy_arena.len(), map.len());
    assert_eq!(copy_arena.get(map.root())?.span(), span(14, 13));
    assert_eq!(
        to_external(&arena, body, &NoAnalysis)?,
        to_external(&copy_arena, map.root(), &NoAnalysis)?
    );

    let mut copy_arena = copy_arena;
    let fresh = copy_arena.name("z", span(0, 1))?;
    let fresh_id = copy_arena.id(fresh)?;
    let all_ids: Vec<u32> = arena
        .handles()
        .map(|handle| arena.id(handle))
        .collect::<Result<_, _>>()?;
    assert!(!all_ids.contains(&fresh_id));
    Ok(())
}

#[test]
fn test_analysis_entries_follow_explicit_remap() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = while_in_block(&mut arena)?;
    let mut table = AnalysisTable::new();
    table.set_criteria(tree.inner, json!(["c1"]));
    table.set_dependencies(tree.inner, json!([{"on": "x"}]));

    let map = arena.clone_subtree(tree.outer, None)?;
    let copy_inner = map.get(tree.inner).unwrap();
    let before = to_external(&arena, copy_inner, &table)?;
    assert_eq!(before["criteria"], json!([]));

    table.carry_over(&map);
    let after = to_external(&arena, copy_inner, &table)?;
    assert_eq!(after["criteria"], json!(["c1"]));
    assert_eq!(after["dependencies"], json!([{"on": "x"}]));
    assert_eq!(
        to_external(&arena, tree.inner, &table)?["criteria"],
        json!(["c1"])
    );
    Ok(())
}

#[test]
fn test_clone_preserves_payload() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    let map = arena.clone_subtree(node, None)?;
    let (NodeKind::Function(source), NodeKind::Function(copy)) =
        (arena.kind(node)?, arena.kind(map.root())?)
    else {
        panic!("expected function nodes");
    };
    assert_eq!((source.lp, source.rp), (copy.lp, copy.rp));
    assert_eq!(source.params.len(), copy.params.len());
    assert_ne!(source.params, copy.params);
    Ok(())
}

#[test]
fn test_clone_into_missing_slot_copies_nothing() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let tree = conditional(&mut arena)?;
    let before = arena.len();
    let err = arena
        .clone_subtree(tree.a, Some((tree.conditional, Slot::Statements)))
        .unwrap_err();
    assert!(matches!(err, AstError::InvalidVariantState { .. }));
    assert_eq!(arena.len(), before);
    assert_eq!(arena.roots().count(), 1);
    Ok(())
}
