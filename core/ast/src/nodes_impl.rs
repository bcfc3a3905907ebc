//! Variant-specific state on top of the generic arena protocol: validated
//! token setters, punctuation positions, flags and composite bounds.

use tracing::trace;

use crate::arena::Arena;
use crate::errors::{AstError, AstResult};
use crate::nodes::{
    ChildSlot, DeclKind, FunctionForm, FunctionType, Keyword, NodeKind, NodeRef, Slot,
};
use crate::token::Token;

fn invalid(kind: &NodeKind, reason: impl Into<String>) -> AstError {
    AstError::InvalidVariantState {
        kind: kind.name(),
        reason: reason.into(),
    }
}

fn invalid_named(kind: &'static str, reason: impl Into<String>) -> AstError {
    AstError::InvalidVariantState {
        kind,
        reason: reason.into(),
    }
}

impl Arena {
    /// Changes the operator of an infix, assignment or unary node.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] if the node has no operator
    /// or `token` is not in that variant's vocabulary.
    pub fn set_operator(&mut self, node: NodeRef, token: Token) -> AstResult<()> {
        let name = self.kind(node)?.name();
        match self.kind_mut_unchecked(node)? {
            NodeKind::Assignment(n) if token.is_assignment_operator() => n.operator = token,
            NodeKind::Infix(n) if token.is_infix_operator() => n.operator = token,
            NodeKind::Unary(n) if token.is_unary_operator() => n.operator = token,
            NodeKind::Assignment(_) | NodeKind::Infix(_) | NodeKind::Unary(_) => {
                return Err(invalid_named(
                    name,
                    format!("`{token}` is not a valid operator here"),
                ));
            }
            _ => return Err(invalid_named(name, "node has no operator")),
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a variable
    /// declaration and `token` is `var`, `const` or `let`.
    pub fn set_decl_kind(&mut self, node: NodeRef, token: Token) -> AstResult<()> {
        let name = self.kind(node)?.name();
        let NodeKind::VariableDeclaration(n) = self.kind_mut_unchecked(node)? else {
            return Err(invalid_named(name, "not a variable declaration"));
        };
        n.kind = DeclKind::from_token(token).ok_or_else(|| {
            invalid_named(name, format!("`{token}` is not a declaration keyword"))
        })?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a keyword
    /// literal and `token` is one of `this`, `null`, `true`, `false` or
    /// `debugger`.
    pub fn set_keyword(&mut self, node: NodeRef, token: Token) -> AstResult<()> {
        let name = self.kind(node)?.name();
        let NodeKind::KeywordLiteral(n) = self.kind_mut_unchecked(node)? else {
            return Err(invalid_named(name, "not a keyword literal"));
        };
        n.keyword = Keyword::from_token(token)
            .ok_or_else(|| invalid_named(name, format!("`{token}` is not a keyword literal")))?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a keyword
    /// literal.
    pub fn is_boolean_literal(&self, node: NodeRef) -> AstResult<bool> {
        match self.kind(node)? {
            NodeKind::KeywordLiteral(n) => Ok(n.keyword.is_boolean()),
            other => Err(invalid(other, "not a keyword literal")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a foreign handle.
    pub fn is_statement(&self, node: NodeRef) -> AstResult<bool> {
        Ok(self.kind(node)?.is_statement())
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a variable
    /// declaration.
    pub fn set_is_statement(&mut self, node: NodeRef, is_statement: bool) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::VariableDeclaration(n) => {
                n.is_statement = is_statement;
                Ok(())
            }
            other => Err(invalid(other, "not a variable declaration")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a unary
    /// expression.
    pub fn set_postfix(&mut self, node: NodeRef, is_postfix: bool) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Unary(n) => {
                n.is_postfix = is_postfix;
                Ok(())
            }
            other => Err(invalid(other, "not a unary expression")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a function.
    pub fn set_function_type(
        &mut self,
        node: NodeRef,
        function_type: FunctionType,
    ) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Function(n) => {
                n.function_type = function_type;
                Ok(())
            }
            other => Err(invalid(other, "not a function")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a function.
    pub fn set_function_form(&mut self, node: NodeRef, form: FunctionForm) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Function(n) => {
                n.form = form;
                Ok(())
            }
            other => Err(invalid(other, "not a function")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a function.
    pub fn set_generator(&mut self, node: NodeRef, is_generator: bool) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Function(n) => {
                n.is_generator = is_generator;
                Ok(())
            }
            other => Err(invalid(other, "not a function")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a function.
    pub fn set_expression_closure(&mut self, node: NodeRef, closure: bool) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Function(n) => {
                n.is_expression_closure = closure;
                Ok(())
            }
            other => Err(invalid(other, "not a function")),
        }
    }

    /// Sets the operator offset (relative to the node) of an infix or
    /// assignment node.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] for any other variant.
    pub fn set_operator_position(&mut self, node: NodeRef, position: i32) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Assignment(n) | NodeKind::Infix(n) => {
                n.operator_position = position;
                Ok(())
            }
            other => Err(invalid(other, "node has no operator position")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is a
    /// conditional expression.
    pub fn set_question_colon(
        &mut self,
        node: NodeRef,
        question: i32,
        colon: i32,
    ) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::Conditional(n) => {
                n.question_mark_position = question;
                n.colon_position = colon;
                Ok(())
            }
            other => Err(invalid(other, "not a conditional expression")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] unless `node` is an element
    /// access.
    pub fn set_brackets(&mut self, node: NodeRef, lb: i32, rb: i32) -> AstResult<()> {
        match self.kind_mut_unchecked(node)? {
            NodeKind::ElementGet(n) => {
                n.lb = lb;
                n.rb = rb;
                Ok(())
            }
            other => Err(invalid(other, "node has no brackets")),
        }
    }

    /// # Errors
    ///
    /// Returns [`AstError::InvalidVariantState`] for variants without
    /// parentheses.
    pub fn set_parens(&mut self, node: NodeRef, lp: i32, rp: i32) -> AstResult<()> {
        let name = self.kind(node)?.name();
        let (left, right) = match self.kind_mut_unchecked(node)? {
            NodeKind::Function(n) => (&mut n.lp, &mut n.rp),
            NodeKind::FunctionCall(n) => (&mut n.lp, &mut n.rp),
            NodeKind::New(n) => (&mut n.lp, &mut n.rp),
            NodeKind::Switch(n) => (&mut n.lp, &mut n.rp),
            NodeKind::While(n) => (&mut n.lp, &mut n.rp),
            NodeKind::With(n) => (&mut n.lp, &mut n.rp),
            _ => return Err(invalid_named(name, "node has no parentheses")),
        };
        *left = lp;
        *right = rp;
        Ok(())
    }

    /// Recomputes the span of a variant with composite bounds from its
    /// children. A node with `fixed_position` set, a variant without
    /// composite bounds, or a node whose children are missing is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::UnknownNode`] for a foreign handle.
    pub fn recompute_bounds(&mut self, node: NodeRef) -> AstResult<()> {
        let entry = self.get(node)?;
        if entry.fixed_position {
            return Ok(());
        }
        let (start, end) = self.absolute_bounds(node)?;
        let bounds = match &entry.kind {
            NodeKind::Assignment(n) | NodeKind::Infix(n) => match (n.left, n.right) {
                (Some(left), Some(right)) => Some((
                    self.absolute_bounds(left)?.0,
                    self.absolute_bounds(right)?.1,
                )),
                _ => None,
            },
            NodeKind::Unary(n) => match n.operand {
                Some(operand) if n.is_postfix => Some((self.absolute_bounds(operand)?.0, end)),
                Some(operand) => Some((start, self.absolute_bounds(operand)?.1)),
                None => None,
            },
            NodeKind::Function(n) => match n.body {
                Some(body) => Some((start, self.absolute_bounds(body)?.1)),
                None => None,
            },
            _ => None,
        };
        if let Some((new_start, new_end)) = bounds {
            self.reposition(node, new_start, new_end)?;
        }
        Ok(())
    }

    /// Moves `node` to the absolute range `[start, end)` while keeping its
    /// children at their absolute positions.
    fn reposition(&mut self, node: NodeRef, start: i32, end: i32) -> AstResult<()> {
        let delta = start - self.absolute_position(node)?;
        let mut children = Vec::new();
        for slot in self.kind(node)?.child_slots() {
            match slot {
                ChildSlot::Required(_, Some(child)) | ChildSlot::Optional(_, Some(child)) => {
                    children.push(child);
                }
                ChildSlot::List(_, list) => children.extend_from_slice(list),
                ChildSlot::Required(_, None) | ChildSlot::Optional(_, None) => {}
            }
        }
        let entry = self.node_mut(node)?;
        entry.span.position += delta;
        entry.span.length = (end - start).max(0);
        for child in children {
            self.node_mut(child)?.span.position -= delta;
        }
        trace!(%node, start, end, "recomputed bounds");
        Ok(())
    }

    /// Hook run after a single-child slot was filled.
    pub(crate) fn after_child_set(&mut self, owner: NodeRef, slot: Slot) -> AstResult<()> {
        if slot == Slot::Body && matches!(self.kind(owner)?, NodeKind::Function(_)) {
            self.recompute_bounds(owner)?;
        }
        Ok(())
    }
}
