use std::sync::Arc;

use jsdelta_ast::{
    analysis::NoAnalysis,
    arena::Arena,
    config::{ExportOptions, IdPolicy},
    errors::AstResult,
    ids::IdGenerator,
    nodes::NodeRef,
    serialize::to_json_string,
    token::Token,
};
use quickcheck::{QuickCheck, TestResult};
use rustc_hash::FxHashSet;

use crate::utils::span;

/// Builds a block of expressions driven by `ops`, stack-machine style.
fn build(arena: &mut Arena, ops: &[u8]) -> AstResult<NodeRef> {
    let operators: Vec<Token> = Token::ALL
        .iter()
        .copied()
        .filter(|token| token.is_infix_operator() && !token.is_assignment_operator())
        .collect();
    let mut stack: Vec<NodeRef> = Vec::new();
    let mut position = 0;
    for op in ops {
        match op % 5 {
            2 if stack.len() >= 2 => {
                let right = stack.pop().unwrap();
                let left = stack.pop().unwrap();
                let operator = operators[usize::from(*op) % operators.len()];
                let at = arena.absolute_bounds(left)?.1;
                stack.push(arena.infix(operator, left, right, at)?);
            }
            3 if !stack.is_empty() => {
                let operand = stack.pop().unwrap();
                let at = arena.absolute_bounds(operand)?.0 - 1;
                stack.push(arena.unary(Token::Not, operand, at, false)?);
            }
            4 if !stack.is_empty() => {
                let inner = stack.pop().unwrap();
                let (start, end) = arena.absolute_bounds(inner)?;
                stack.push(arena.parenthesized(inner, span(start - 1, end - start + 2))?);
            }
            _ => {
                stack.push(arena.name(format!("v{op}"), span(position, 1))?);
                position += 2;
            }
        }
    }
    arena.block(&stack, span(0, position))
}

#[test]
fn test_walk_reaches_every_node() {
    fn prop(ops: Vec<u8>) -> TestResult {
        let mut arena = Arena::new();
        let Ok(root) = build(&mut arena, &ops) else {
            return TestResult::failed();
        };
        match arena.pre_order(root) {
            Ok(nodes) => TestResult::from_bool(nodes.len() == arena.len() && nodes[0] == root),
            Err(_) => TestResult::failed(),
        }
    }
    QuickCheck::new().tests(200).quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

#[test]
fn test_clone_exports_identically() {
    fn prop(ops: Vec<u8>) -> TestResult {
        let mut arena = Arena::new();
        let Ok(root) = build(&mut arena, &ops) else {
            return TestResult::failed();
        };
        let Ok(map) = arena.clone_subtree(root, None) else {
            return TestResult::failed();
        };
        let options = ExportOptions::default();
        let source = to_json_string(&arena, root, &NoAnalysis, options);
        let copy = to_json_string(&arena, map.root(), &NoAnalysis, options);
        let disjoint = map.iter().all(|(from, to)| from != to);
        TestResult::from_bool(source.is_ok() && source == copy && disjoint)
    }
    QuickCheck::new().tests(200).quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

#[test]
fn test_ids_unique_within_range() {
    fn prop(ops: Vec<u8>) -> TestResult {
        let ids = Arc::new(IdGenerator::new(IdPolicy {
            start: 1,
            max: 10_000,
        }));
        let mut arena = Arena::with_id_generator(ids);
        let Ok(root) = build(&mut arena, &ops) else {
            return TestResult::failed();
        };
        let Ok(nodes) = arena.pre_order(root) else {
            return TestResult::failed();
        };
        let mut seen = FxHashSet::default();
        let unique = nodes
            .iter()
            .all(|node| arena.id(*node).is_ok_and(|id| seen.insert(id)));
        TestResult::from_bool(unique)
    }
    QuickCheck::new().tests(100).quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

#[test]
fn test_ids_wrap_to_start() {
    let ids = Arc::new(IdGenerator::new(IdPolicy { start: 3, max: 4 }));
    let mut arena = Arena::with_id_generator(ids.clone());
    let drawn: Vec<u32> = (0..5)
        .map(|i| arena.name("n", span(i, 1)).and_then(|node| arena.id(node)))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(drawn, vec![3, 4, 3, 4, 3]);
    assert_eq!(ids.peek(), 4);
}
