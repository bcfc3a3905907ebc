use jsdelta_ast::{
    arena::Arena,
    errors::AstResult,
    nodes::{NodeRef, Span},
};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn span(position: i32, length: i32) -> Span {
    Span::new(position, length)
}

/// Handles of the tree built by [`while_in_block`].
pub(crate) struct WhileTree {
    pub outer: NodeRef,
    pub while_loop: NodeRef,
    pub x: NodeRef,
    pub inner: NodeRef,
    pub statement: NodeRef,
    pub y: NodeRef,
}

/// `{ while (x) { y; } }`
pub(crate) fn while_in_block(arena: &mut Arena) -> AstResult<WhileTree> {
    let x = arena.name("x", span(9, 1))?;
    let y = arena.name("y", span(14, 1))?;
    let statement = arena.expression_statement(y, span(14, 2))?;
    let inner = arena.block(&[statement], span(12, 6))?;
    let while_loop = arena.while_loop(x, inner, span(2, 16))?;
    arena.set_parens(while_loop, 6, 8)?;
    let outer = arena.block(&[while_loop], span(0, 20))?;
    Ok(WhileTree {
        outer,
        while_loop,
        x,
        inner,
        statement,
        y,
    })
}

/// Handles of the tree built by [`conditional`].
pub(crate) struct ConditionalTree {
    pub conditional: NodeRef,
    pub a: NodeRef,
    pub b: NodeRef,
    pub c: NodeRef,
}

/// `a ? b : c`
pub(crate) fn conditional(arena: &mut Arena) -> AstResult<ConditionalTree> {
    let a = arena.name("a", span(0, 1))?;
    let b = arena.name("b", span(4, 1))?;
    let c = arena.name("c", span(8, 1))?;
    let conditional = arena.conditional(a, b, c, span(0, 9))?;
    arena.set_question_colon(conditional, 2, 6)?;
    Ok(ConditionalTree {
        conditional,
        a,
        b,
        c,
    })
}

/// `function f(p) { return p; }`, built with every child present.
pub(crate) fn function(arena: &mut Arena) -> AstResult<NodeRef> {
    let name = arena.name("f", span(9, 1))?;
    let param = arena.name("p", span(11, 1))?;
    let value = arena.name("p", span(23, 1))?;
    let ret = arena.return_statement(Some(value), span(16, 9))?;
    let body = arena.block(&[ret], span(14, 13))?;
    let function = arena.function(Some(name), &[param], body, span(0, 1))?;
    arena.set_parens(function, 10, 12)?;
    Ok(function)
}
