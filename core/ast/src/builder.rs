//! Typed constructors for every node variant.
//!
//! These are the entry points an external parser uses to assemble a tree
//! bottom-up. Children passed in are attached to the new node and their
//! positions rebased to be relative to it, so callers pass absolute spans
//! throughout:
//!
//! ```
//! use jsdelta_ast::arena::Arena;
//! use jsdelta_ast::nodes::Span;
//! use jsdelta_ast::token::Token;
//!
//! let mut arena = Arena::new();
//! let a = arena.name("a", Span::new(0, 1)).unwrap();
//! let b = arena.name("b", Span::new(4, 1)).unwrap();
//! let sum = arena.infix(Token::Add, a, b, 2).unwrap();
//! assert_eq!(arena.get(sum).unwrap().span(), Span::new(0, 5));
//! assert_eq!(arena.get(b).unwrap().span().position, 4);
//! ```
//!
//! Variants with composite bounds (infix, assignment, unary, function)
//! derive their span from the children; all others take it explicitly.
//! Punctuation positions start out as `-1` and are filled through the
//! punctuation setters on [`Arena`].

use crate::arena::Arena;
use crate::errors::{AstError, AstResult};
use crate::nodes::{
    Block, Call, Conditional, DeclKind, ElementGet, ExpressionStatement, Function, FunctionForm,
    FunctionType, Infix, Keyword, KeywordLiteral, Name, New, NodeKind, NodeRef, NumberLiteral,
    ObjectLiteral, ObjectProperty, Parenthesized, Return, Span, StringLiteral, Switch, SwitchCase,
    Slot, Throw, Unary, VariableDeclaration, VariableInitializer, While, With, Yield,
};
use crate::token::Token;

const UNKNOWN_POSITION: i32 = -1;

impl Arena {
    /// # Errors
    ///
    /// Never fails for a fresh leaf; the `Result` keeps constructors uniform.
    pub fn name(&mut self, identifier: impl Into<String>, span: Span) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::Name(Name {
                identifier: identifier.into(),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Never fails for a fresh leaf.
    pub fn number_literal(
        &mut self,
        value: f64,
        raw: impl Into<String>,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::NumberLiteral(NumberLiteral {
                value,
                raw: raw.into(),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Never fails for a fresh leaf.
    pub fn string_literal(
        &mut self,
        value: impl Into<String>,
        quote: char,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::StringLiteral(StringLiteral {
                value: value.into(),
                quote,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `token` is one of
    /// `this`, `null`, `true`, `false` or `debugger`.
    pub fn keyword_literal(&mut self, token: Token, span: Span) -> AstResult<NodeRef> {
        let keyword = Keyword::from_token(token).ok_or_else(|| AstError::InvalidVariantState {
            kind: "KeywordLiteral",
            reason: format!("`{token}` is not a keyword literal"),
        })?;
        self.alloc(NodeKind::KeywordLiteral(KeywordLiteral { keyword }), span)
    }

    /// # Errors
    ///
    /// Never fails for a fresh leaf.
    pub fn empty(&mut self, span: Span) -> AstResult<NodeRef> {
        self.alloc(NodeKind::Empty, span)
    }

    /// Builds `left <operator> right` spanning `[left.start, right.end)`.
    /// `operator_position` is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if `operator` is not an
    /// infix token, and [`AstError::InvalidChild`] for unusable children.
    pub fn infix(
        &mut self,
        operator: Token,
        left: NodeRef,
        right: NodeRef,
        operator_position: i32,
    ) -> AstResult<NodeRef> {
        if !operator.is_infix_operator() {
            return Err(AstError::InvalidVariantState {
                kind: "InfixExpression",
                reason: format!("`{operator}` is not an infix operator"),
            });
        }
        let (span, payload) = self.infix_payload(operator, left, right, operator_position)?;
        self.alloc(NodeKind::Infix(payload), span)
    }

    /// Builds `left <operator> right` for an assignment operator.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if `operator` is not an
    /// assignment token, and [`AstError::InvalidChild`] for unusable
    /// children.
    pub fn assignment(
        &mut self,
        operator: Token,
        left: NodeRef,
        right: NodeRef,
        operator_position: i32,
    ) -> AstResult<NodeRef> {
        if !operator.is_assignment_operator() {
            return Err(AstError::InvalidVariantState {
                kind: "Assignment",
                reason: format!("`{operator}` is not an assignment operator"),
            });
        }
        let (span, payload) = self.infix_payload(operator, left, right, operator_position)?;
        self.alloc(NodeKind::Assignment(payload), span)
    }

    fn infix_payload(
        &self,
        operator: Token,
        left: NodeRef,
        right: NodeRef,
        operator_position: i32,
    ) -> AstResult<(Span, Infix)> {
        let start = self.child_bounds("InfixExpression", Slot::Left, left)?.0;
        let end = self.child_bounds("InfixExpression", Slot::Right, right)?.1;
        let relative_operator = if operator_position < 0 {
            UNKNOWN_POSITION
        } else {
            operator_position - start
        };
        Ok((
            Span::between(start, end),
            Infix {
                operator,
                left: Some(left),
                right: Some(right),
                operator_position: relative_operator,
            },
        ))
    }

    /// Builds a unary or update expression. `operator_position` is absolute;
    /// a prefix node spans `[operator, operand.end)` and a postfix node
    /// `[operand.start, operator + 2)`.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if `operator` is not a
    /// unary token.
    pub fn unary(
        &mut self,
        operator: Token,
        operand: NodeRef,
        operator_position: i32,
        is_postfix: bool,
    ) -> AstResult<NodeRef> {
        if !operator.is_unary_operator() {
            return Err(AstError::InvalidVariantState {
                kind: "UnaryExpression",
                reason: format!("`{operator}` is not a unary operator"),
            });
        }
        let (operand_start, operand_end) =
            self.child_bounds("UnaryExpression", Slot::Operand, operand)?;
        let span = if is_postfix {
            Span::between(operand_start, operator_position + 2)
        } else {
            Span::between(operator_position, operand_end)
        };
        self.alloc(
            NodeKind::Unary(Unary {
                operator,
                operand: Some(operand),
                is_postfix,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn conditional(
        &mut self,
        test: NodeRef,
        consequent: NodeRef,
        alternate: NodeRef,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::Conditional(Conditional {
                test: Some(test),
                consequent: Some(consequent),
                alternate: Some(alternate),
                question_mark_position: UNKNOWN_POSITION,
                colon_position: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn element_get(
        &mut self,
        target: NodeRef,
        element: NodeRef,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::ElementGet(ElementGet {
                target: Some(target),
                element: Some(element),
                lb: UNKNOWN_POSITION,
                rb: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// Builds a function. `span` gives the start; the length is extended to
    /// the end of `body`.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn function(
        &mut self,
        name: Option<NodeRef>,
        params: &[NodeRef],
        body: NodeRef,
        span: Span,
    ) -> AstResult<NodeRef> {
        let node = self.alloc(
            NodeKind::Function(Function {
                name,
                params: params.to_vec(),
                body: Some(body),
                member_expr: None,
                function_type: FunctionType::default(),
                form: FunctionForm::default(),
                is_generator: false,
                is_expression_closure: false,
                lp: UNKNOWN_POSITION,
                rp: UNKNOWN_POSITION,
            }),
            span,
        )?;
        self.recompute_bounds(node)?;
        Ok(node)
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn call(
        &mut self,
        target: NodeRef,
        arguments: &[NodeRef],
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::FunctionCall(Call {
                target: Some(target),
                arguments: arguments.to_vec(),
                lp: UNKNOWN_POSITION,
                rp: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn new_expression(
        &mut self,
        target: NodeRef,
        arguments: &[NodeRef],
        initializer: Option<NodeRef>,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::New(New {
                target: Some(target),
                arguments: arguments.to_vec(),
                initializer,
                lp: UNKNOWN_POSITION,
                rp: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn block(&mut self, statements: &[NodeRef], span: Span) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::Block(Block {
                statements: statements.to_vec(),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn script(&mut self, statements: &[NodeRef], span: Span) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::Script(Block {
                statements: statements.to_vec(),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn switch(
        &mut self,
        discriminant: NodeRef,
        cases: &[NodeRef],
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::Switch(Switch {
                discriminant: Some(discriminant),
                cases: cases.to_vec(),
                lp: UNKNOWN_POSITION,
                rp: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// `expression: None` builds the `default:` case.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn switch_case(
        &mut self,
        expression: Option<NodeRef>,
        statements: &[NodeRef],
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::SwitchCase(SwitchCase {
                expression,
                statements: statements.to_vec(),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn return_statement(&mut self, value: Option<NodeRef>, span: Span) -> AstResult<NodeRef> {
        self.alloc(NodeKind::Return(Return { value }), span)
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn throw(&mut self, expression: NodeRef, span: Span) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::Throw(Throw {
                expression: Some(expression),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn yield_expression(&mut self, value: Option<NodeRef>, span: Span) -> AstResult<NodeRef> {
        self.alloc(NodeKind::Yield(Yield { value }), span)
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn while_loop(
        &mut self,
        condition: NodeRef,
        body: NodeRef,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::While(While {
                condition: Some(condition),
                body: Some(body),
                lp: UNKNOWN_POSITION,
                rp: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn with_statement(
        &mut self,
        object: NodeRef,
        statement: NodeRef,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::With(With {
                object: Some(object),
                statement: Some(statement),
                lp: UNKNOWN_POSITION,
                rp: UNKNOWN_POSITION,
            }),
            span,
        )
    }

    /// Builds a `var`, `const` or `let` declaration in expression position;
    /// see [`Arena::set_is_statement`].
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if `token` is not a
    /// declaration keyword.
    pub fn variable_declaration(
        &mut self,
        token: Token,
        declarators: &[NodeRef],
        span: Span,
    ) -> AstResult<NodeRef> {
        let kind = DeclKind::from_token(token).ok_or_else(|| AstError::InvalidVariantState {
            kind: "VariableDeclaration",
            reason: format!("`{token}` is not a declaration keyword"),
        })?;
        self.alloc(
            NodeKind::VariableDeclaration(VariableDeclaration {
                kind,
                declarators: declarators.to_vec(),
                is_statement: false,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn variable_initializer(
        &mut self,
        target: NodeRef,
        initializer: Option<NodeRef>,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::VariableInitializer(VariableInitializer {
                target: Some(target),
                initializer,
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn parenthesized(&mut self, inner: NodeRef, span: Span) -> AstResult<NodeRef> {
        self.alloc(NodeKind::Parenthesized(Parenthesized { inner: Some(inner) }), span)
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn expression_statement(&mut self, expression: NodeRef, span: Span) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::ExpressionStatement(ExpressionStatement {
                expression: Some(expression),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn object_literal(&mut self, properties: &[NodeRef], span: Span) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::ObjectLiteral(ObjectLiteral {
                properties: properties.to_vec(),
            }),
            span,
        )
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidChild`] for unusable children.
    pub fn object_property(
        &mut self,
        key: NodeRef,
        value: NodeRef,
        span: Span,
    ) -> AstResult<NodeRef> {
        self.alloc(
            NodeKind::ObjectProperty(ObjectProperty {
                key: Some(key),
                value: Some(value),
            }),
            span,
        )
    }

    fn child_bounds(
        &self,
        kind: &'static str,
        slot: Slot,
        child: NodeRef,
    ) -> AstResult<(i32, i32)> {
        self.absolute_bounds(child).map_err(|_| AstError::InvalidChild {
            kind,
            slot,
            reason: "child is not a node of this arena",
        })
    }
}
