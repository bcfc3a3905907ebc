use jsdelta_ast::{
    arena::Arena,
    errors::AstError,
    nodes::{FunctionForm, FunctionType, NodeKind, Slot},
    token::Token,
};

use crate::utils::{function, span};

#[test]
fn test_infix_bounds_cover_operands() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let a = arena.name("a", span(3, 1))?;
    let b = arena.name("b", span(7, 2))?;
    let sum = arena.infix(Token::Add, a, b, 5)?;
    assert_eq!(arena.get(sum)?.span(), span(3, 6));
    let NodeKind::Infix(payload) = arena.kind(sum)? else {
        panic!("expected an infix node");
    };
    assert_eq!(payload.operator_position, 2);
    assert_eq!(arena.get(a)?.span().position, 0);
    assert_eq!(arena.get(b)?.span().position, 4);
    Ok(())
}

#[test]
fn test_assignment_requires_assignment_operator() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let a = arena.name("a", span(0, 1))?;
    let b = arena.name("b", span(5, 1))?;
    let err = arena.assignment(Token::Add, a, b, 2).unwrap_err();
    assert!(matches!(err, AstError::InvalidVariantState { .. }));
    let assign = arena.assignment(Token::AssignAdd, a, b, 2)?;
    assert_eq!(arena.kind(assign)?.name(), "Assignment");
    assert_eq!(arena.parent(a)?, Some(assign));
    Ok(())
}

#[test]
fn test_infix_rejects_same_node_twice() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let a = arena.name("a", span(0, 1))?;
    let err = arena.infix(Token::Mul, a, a, 2).unwrap_err();
    assert!(matches!(err, AstError::InvalidChild { .. }));
    Ok(())
}

#[test]
fn test_unary_prefix_and_postfix_bounds() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let x = arena.name("x", span(1, 1))?;
    let neg = arena.unary(Token::Neg, x, 0, false)?;
    assert_eq!(arena.get(neg)?.span(), span(0, 2));

    let y = arena.name("y", span(10, 1))?;
    let inc = arena.unary(Token::Inc, y, 11, true)?;
    assert_eq!(arena.get(inc)?.span(), span(10, 3));

    let z = arena.name("z", span(20, 1))?;
    let err = arena.unary(Token::Add, z, 19, false).unwrap_err();
    assert!(matches!(err, AstError::InvalidVariantState { .. }));
    Ok(())
}

#[test]
fn test_function_extends_to_body_end() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    assert_eq!(arena.get(node)?.span(), span(0, 27));
    let NodeKind::Function(payload) = arena.kind(node)? else {
        panic!("expected a function node");
    };
    assert_eq!(payload.lp, 10);
    assert_eq!(payload.rp, 12);
    assert_eq!(payload.function_type, FunctionType::Statement);
    assert_eq!(payload.form, FunctionForm::Function);
    Ok(())
}

#[test]
fn test_replacing_function_body_recomputes_length() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    let longer = arena.block(&[], span(14, 30))?;
    arena.set_child(node, Slot::Body, Some(longer))?;
    assert_eq!(arena.get(node)?.span(), span(0, 44));
    Ok(())
}

#[test]
fn test_fixed_position_suppresses_recomputation() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    arena.set_fixed_position(node, true)?;
    let longer = arena.block(&[], span(14, 30))?;
    arena.set_child(node, Slot::Body, Some(longer))?;
    assert_eq!(arena.get(node)?.span(), span(0, 27));
    Ok(())
}

#[test]
fn test_recompute_keeps_children_in_place() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let a = arena.name("a", span(0, 1))?;
    let b = arena.name("b", span(4, 1))?;
    let sum = arena.infix(Token::Add, a, b, 2)?;
    let c = arena.name("c", span(2, 1))?;
    arena.set_child(sum, Slot::Left, Some(c))?;
    assert_eq!(arena.get(sum)?.span(), span(0, 5));

    arena.recompute_bounds(sum)?;
    assert_eq!(arena.get(sum)?.span(), span(2, 3));
    assert_eq!(arena.get(b)?.span().position, 2);
    assert_eq!(arena.absolute_bounds(b)?, (4, 5));
    assert_eq!(arena.absolute_bounds(c)?, (2, 3));
    assert_eq!(arena.absolute_bounds(a)?, (0, 1));
    Ok(())
}

#[test]
fn test_punctuation_setters_check_variant() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let target = arena.name("o", span(0, 1))?;
    let element = arena.number_literal(0.0, "0", span(2, 1))?;
    let get = arena.element_get(target, element, span(0, 4))?;
    arena.set_brackets(get, 1, 3)?;
    let NodeKind::ElementGet(payload) = arena.kind(get)? else {
        panic!("expected an element access");
    };
    assert_eq!((payload.lb, payload.rb), (1, 3));

    assert!(matches!(
        arena.set_parens(get, 1, 3).unwrap_err(),
        AstError::InvalidVariantState { .. }
    ));
    assert!(arena.set_question_colon(get, 1, 3).is_err());
    assert!(arena.set_operator_position(get, 1).is_err());
    Ok(())
}

#[test]
fn test_function_flags() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let node = function(&mut arena)?;
    arena.set_generator(node, true)?;
    arena.set_expression_closure(node, true)?;
    arena.set_function_type(node, FunctionType::Expression)?;
    arena.set_function_form(node, FunctionForm::Getter)?;
    assert!(!arena.is_statement(node)?);
    let NodeKind::Function(payload) = arena.kind(node)? else {
        panic!("expected a function node");
    };
    assert!(payload.is_generator);
    assert!(payload.is_expression_closure);
    assert_eq!(payload.form, FunctionForm::Getter);

    let x = arena.name("x", span(0, 1))?;
    assert!(arena.set_generator(x, true).is_err());
    Ok(())
}

#[test]
fn test_new_expression_optional_initializer() -> anyhow::Result<()> {
    let mut arena = Arena::new();
    let target = arena.name("Foo", span(4, 3))?;
    let arg = arena.number_literal(1.0, "1", span(8, 1))?;
    let init = arena.object_literal(&[], span(11, 2))?;
    let node = arena.new_expression(target, &[arg], Some(init), span(0, 13))?;
    assert_eq!(arena.children(node)?, vec![target, arg, init]);
    arena.set_child(node, Slot::Initializer, None)?;
    assert_eq!(arena.children(node)?, vec![target, arg]);
    Ok(())
}
