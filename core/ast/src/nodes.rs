//! The closed set of node shapes.
//!
//! A [`Node`] holds what every shape shares (identity, span, parent relation,
//! change annotations); [`NodeKind`] holds the per-variant payload. Child
//! links are [`NodeRef`] handles into the owning [`crate::arena::Arena`].
//!
//! Required children are stored as `Option<NodeRef>` so a parser can
//! allocate a node first and fill its slots afterwards. The accessors in
//! the arena refuse to store `None` in a required slot; a hole that is
//! still there when the tree is cloned, walked or serialized surfaces as
//! [`crate::errors::AstError::MalformedTreeAccess`].

use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::change::ChangeInfo;
use crate::token::Token;

/// Handle addressing one node inside an arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef(pub(crate) u32);

impl NodeRef {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source extent of a node. `position` is relative to the parent once the
/// node is attached and absolute for a root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub position: i32,
    pub length: i32,
}

impl Span {
    #[must_use]
    pub fn new(position: i32, length: i32) -> Self {
        Self { position, length }
    }

    /// Span covering `[start, end)`.
    #[must_use]
    pub fn between(start: i32, end: i32) -> Self {
        Self {
            position: start,
            length: (end - start).max(0),
        }
    }

    #[must_use]
    pub fn end(self) -> i32 {
        self.position + self.length
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}+{}", self.position, self.length)
    }
}

/// Named child position of a node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Left,
    Right,
    Test,
    Consequent,
    Alternate,
    Target,
    Element,
    Name,
    Params,
    Body,
    MemberExpr,
    Arguments,
    Initializer,
    Statements,
    Discriminant,
    Cases,
    Value,
    Expression,
    Condition,
    Object,
    Statement,
    Declarators,
    Operand,
    Inner,
    Properties,
    Key,
}

impl Slot {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Right => "right",
            Slot::Test => "test",
            Slot::Consequent => "consequent",
            Slot::Alternate => "alternate",
            Slot::Target => "target",
            Slot::Element => "element",
            Slot::Name => "name",
            Slot::Params => "params",
            Slot::Body => "body",
            Slot::MemberExpr => "memberExprNode",
            Slot::Arguments => "arguments",
            Slot::Initializer => "initializer",
            Slot::Statements => "statements",
            Slot::Discriminant => "discriminant",
            Slot::Cases => "cases",
            Slot::Value => "value",
            Slot::Expression => "expression",
            Slot::Condition => "condition",
            Slot::Object => "object",
            Slot::Statement => "statement",
            Slot::Declarators => "declarators",
            Slot::Operand => "operand",
            Slot::Inner => "inner",
            Slot::Properties => "properties",
            Slot::Key => "key",
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Var,
    Const,
    Let,
}

impl DeclKind {
    #[must_use]
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Var => Some(DeclKind::Var),
            Token::Const => Some(DeclKind::Const),
            Token::Let => Some(DeclKind::Let),
            _ => None,
        }
    }

    #[must_use]
    pub fn token(self) -> Token {
        match self {
            DeclKind::Var => Token::Var,
            DeclKind::Const => Token::Const,
            DeclKind::Let => Token::Let,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Const => "const",
            DeclKind::Let => "let",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    This,
    Null,
    True,
    False,
    Debugger,
}

impl Keyword {
    #[must_use]
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::This => Some(Keyword::This),
            Token::Null => Some(Keyword::Null),
            Token::True => Some(Keyword::True),
            Token::False => Some(Keyword::False),
            Token::Debugger => Some(Keyword::Debugger),
            _ => None,
        }
    }

    #[must_use]
    pub fn token(self) -> Token {
        match self {
            Keyword::This => Token::This,
            Keyword::Null => Token::Null,
            Keyword::True => Token::True,
            Keyword::False => Token::False,
            Keyword::Debugger => Token::Debugger,
        }
    }

    #[must_use]
    pub fn is_boolean(self) -> bool {
        matches!(self, Keyword::True | Keyword::False)
    }
}

/// Where a function appears syntactically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionType {
    /// Top-level statement in a script or function body.
    #[default]
    Statement,
    Expression,
    /// Function expression that is itself the expression of a statement.
    ExpressionStatement,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionForm {
    #[default]
    Function,
    Getter,
    Setter,
}

macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            $struct_vis:vis struct $name:ident {
                $(
                    $(#[$field_attr:meta])*
                    $field_vis:vis $field_name:ident : $field_ty:ty
                ),* $(,)?
            }
        )+
    ) => {
        $(
            $(#[$outer])*
            #[derive(Clone, PartialEq, Debug)]
            $struct_vis struct $name {
                $(
                    $(#[$field_attr])*
                    $field_vis $field_name : $field_ty,
                )*
            }
        )+
    };
}

ast_nodes! {

    /// Binary operator application; also the payload of assignments.
    pub struct Infix {
        pub operator: Token,
        pub left: Option<NodeRef>,
        pub right: Option<NodeRef>,
        /// Offset of the operator relative to this node, `-1` if unknown.
        pub operator_position: i32,
    }

    pub struct Conditional {
        pub test: Option<NodeRef>,
        pub consequent: Option<NodeRef>,
        pub alternate: Option<NodeRef>,
        pub question_mark_position: i32,
        pub colon_position: i32,
    }

    /// Indexed property access, `target[element]`.
    pub struct ElementGet {
        pub target: Option<NodeRef>,
        pub element: Option<NodeRef>,
        pub lb: i32,
        /// `-1` when the closing bracket is missing.
        pub rb: i32,
    }

    pub struct Function {
        pub name: Option<NodeRef>,
        pub params: Vec<NodeRef>,
        pub body: Option<NodeRef>,
        /// The `function a.b.c() {}` extension: the member expression
        /// written in name position.
        pub member_expr: Option<NodeRef>,
        pub function_type: FunctionType,
        pub form: FunctionForm,
        pub is_generator: bool,
        pub is_expression_closure: bool,
        pub lp: i32,
        pub rp: i32,
    }

    pub struct Call {
        pub target: Option<NodeRef>,
        pub arguments: Vec<NodeRef>,
        pub lp: i32,
        pub rp: i32,
    }

    pub struct New {
        pub target: Option<NodeRef>,
        pub arguments: Vec<NodeRef>,
        /// Trailing object literal of `new expr(args) { ... }`.
        pub initializer: Option<NodeRef>,
        pub lp: i32,
        pub rp: i32,
    }

    pub struct Block {
        pub statements: Vec<NodeRef>,
    }

    pub struct Switch {
        pub discriminant: Option<NodeRef>,
        pub cases: Vec<NodeRef>,
        pub lp: i32,
        pub rp: i32,
    }

    /// `case expr:` or, with no expression, `default:`.
    pub struct SwitchCase {
        pub expression: Option<NodeRef>,
        pub statements: Vec<NodeRef>,
    }

    pub struct Return {
        pub value: Option<NodeRef>,
    }

    pub struct Throw {
        pub expression: Option<NodeRef>,
    }

    pub struct Yield {
        pub value: Option<NodeRef>,
    }

    pub struct While {
        pub condition: Option<NodeRef>,
        pub body: Option<NodeRef>,
        pub lp: i32,
        pub rp: i32,
    }

    pub struct With {
        pub object: Option<NodeRef>,
        pub statement: Option<NodeRef>,
        pub lp: i32,
        pub rp: i32,
    }

    pub struct VariableDeclaration {
        pub kind: DeclKind,
        pub declarators: Vec<NodeRef>,
        pub is_statement: bool,
    }

    pub struct VariableInitializer {
        pub target: Option<NodeRef>,
        pub initializer: Option<NodeRef>,
    }

    pub struct Unary {
        pub operator: Token,
        pub operand: Option<NodeRef>,
        pub is_postfix: bool,
    }

    pub struct KeywordLiteral {
        pub keyword: Keyword,
    }

    pub struct Parenthesized {
        pub inner: Option<NodeRef>,
    }

    pub struct Name {
        pub identifier: String,
    }

    pub struct NumberLiteral {
        pub value: f64,
        /// Source text of the literal.
        pub raw: String,
    }

    pub struct StringLiteral {
        pub value: String,
        pub quote: char,
    }

    pub struct ExpressionStatement {
        pub expression: Option<NodeRef>,
    }

    pub struct ObjectLiteral {
        pub properties: Vec<NodeRef>,
    }

    pub struct ObjectProperty {
        pub key: Option<NodeRef>,
        pub value: Option<NodeRef>,
    }
}

/// Read view of one child position, in traversal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildSlot<'a> {
    Required(Slot, Option<NodeRef>),
    Optional(Slot, Option<NodeRef>),
    List(Slot, &'a [NodeRef]),
}

/// Write view of one child position.
#[derive(Debug)]
pub enum ChildSlotMut<'a> {
    Required(Slot, &'a mut Option<NodeRef>),
    Optional(Slot, &'a mut Option<NodeRef>),
    List(Slot, &'a mut Vec<NodeRef>),
}

impl ChildSlotMut<'_> {
    #[must_use]
    pub fn slot(&self) -> Slot {
        match self {
            ChildSlotMut::Required(slot, _)
            | ChildSlotMut::Optional(slot, _)
            | ChildSlotMut::List(slot, _) => *slot,
        }
    }
}

macro_rules! node_kinds {
    (
        $(
            $(#[$arm_attr:meta])*
            $arm:ident $( ( $payload:ty ) )? => $name:literal,
        )+
    ) => {
        #[derive(Clone, PartialEq, Debug)]
        pub enum NodeKind {
            $(
                $(#[$arm_attr])*
                $arm $( ( $payload ) )?,
            )+
        }

        impl NodeKind {
            /// Variant name used in diagnostics.
            #[must_use]
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        NodeKind::$arm { .. } => $name,
                    )+
                }
            }
        }
    };
}

node_kinds! {
    Assignment(Infix) => "Assignment",
    Infix(Infix) => "InfixExpression",
    Conditional(Conditional) => "ConditionalExpression",
    ElementGet(ElementGet) => "ElementGet",
    Function(Function) => "FunctionNode",
    FunctionCall(Call) => "FunctionCall",
    New(New) => "NewExpression",
    Block(Block) => "Block",
    /// Root of a parsed file.
    Script(Block) => "Script",
    Switch(Switch) => "SwitchStatement",
    SwitchCase(SwitchCase) => "SwitchCase",
    Return(Return) => "ReturnStatement",
    Throw(Throw) => "ThrowStatement",
    Yield(Yield) => "Yield",
    While(While) => "WhileLoop",
    With(With) => "WithStatement",
    VariableDeclaration(VariableDeclaration) => "VariableDeclaration",
    VariableInitializer(VariableInitializer) => "VariableInitializer",
    Unary(Unary) => "UnaryExpression",
    KeywordLiteral(KeywordLiteral) => "KeywordLiteral",
    Parenthesized(Parenthesized) => "ParenthesizedExpression",
    Empty => "EmptyExpression",
    Name(Name) => "Name",
    NumberLiteral(NumberLiteral) => "NumberLiteral",
    StringLiteral(StringLiteral) => "StringLiteral",
    ExpressionStatement(ExpressionStatement) => "ExpressionStatement",
    ObjectLiteral(ObjectLiteral) => "ObjectLiteral",
    ObjectProperty(ObjectProperty) => "ObjectProperty",
}

impl NodeKind {
    /// Child positions in the order a pre-order walk visits them.
    #[must_use]
    pub fn child_slots(&self) -> Vec<ChildSlot<'_>> {
        use ChildSlot::{List, Optional, Required};
        match self {
            NodeKind::Assignment(n) | NodeKind::Infix(n) => {
                vec![Required(Slot::Left, n.left), Required(Slot::Right, n.right)]
            }
            NodeKind::Conditional(n) => vec![
                Required(Slot::Test, n.test),
                Required(Slot::Consequent, n.consequent),
                Required(Slot::Alternate, n.alternate),
            ],
            NodeKind::ElementGet(n) => vec![
                Required(Slot::Target, n.target),
                Required(Slot::Element, n.element),
            ],
            NodeKind::Function(n) => vec![
                Optional(Slot::Name, n.name),
                List(Slot::Params, &n.params),
                Required(Slot::Body, n.body),
                Optional(Slot::MemberExpr, n.member_expr),
            ],
            NodeKind::FunctionCall(n) => vec![
                Required(Slot::Target, n.target),
                List(Slot::Arguments, &n.arguments),
            ],
            NodeKind::New(n) => vec![
                Required(Slot::Target, n.target),
                List(Slot::Arguments, &n.arguments),
                Optional(Slot::Initializer, n.initializer),
            ],
            NodeKind::Block(n) | NodeKind::Script(n) => vec![List(Slot::Statements, &n.statements)],
            NodeKind::Switch(n) => vec![
                Required(Slot::Discriminant, n.discriminant),
                List(Slot::Cases, &n.cases),
            ],
            NodeKind::SwitchCase(n) => vec![
                Optional(Slot::Expression, n.expression),
                List(Slot::Statements, &n.statements),
            ],
            NodeKind::Return(n) => vec![Optional(Slot::Value, n.value)],
            NodeKind::Throw(n) => vec![Required(Slot::Expression, n.expression)],
            NodeKind::Yield(n) => vec![Optional(Slot::Value, n.value)],
            NodeKind::While(n) => vec![
                Required(Slot::Condition, n.condition),
                Required(Slot::Body, n.body),
            ],
            NodeKind::With(n) => vec![
                Required(Slot::Object, n.object),
                Required(Slot::Statement, n.statement),
            ],
            NodeKind::VariableDeclaration(n) => vec![List(Slot::Declarators, &n.declarators)],
            NodeKind::VariableInitializer(n) => vec![
                Required(Slot::Target, n.target),
                Optional(Slot::Initializer, n.initializer),
            ],
            NodeKind::Unary(n) => vec![Required(Slot::Operand, n.operand)],
            NodeKind::Parenthesized(n) => vec![Required(Slot::Inner, n.inner)],
            NodeKind::ExpressionStatement(n) => vec![Required(Slot::Expression, n.expression)],
            NodeKind::ObjectLiteral(n) => vec![List(Slot::Properties, &n.properties)],
            NodeKind::ObjectProperty(n) => vec![
                Required(Slot::Key, n.key),
                Required(Slot::Value, n.value),
            ],
            NodeKind::KeywordLiteral(_)
            | NodeKind::Empty
            | NodeKind::Name(_)
            | NodeKind::NumberLiteral(_)
            | NodeKind::StringLiteral(_) => Vec::new(),
        }
    }

    /// Mutable counterpart of [`NodeKind::child_slots`], same order.
    pub fn child_slots_mut(&mut self) -> Vec<ChildSlotMut<'_>> {
        use ChildSlotMut::{List, Optional, Required};
        match self {
            NodeKind::Assignment(n) | NodeKind::Infix(n) => vec![
                Required(Slot::Left, &mut n.left),
                Required(Slot::Right, &mut n.right),
            ],
            NodeKind::Conditional(n) => vec![
                Required(Slot::Test, &mut n.test),
                Required(Slot::Consequent, &mut n.consequent),
                Required(Slot::Alternate, &mut n.alternate),
            ],
            NodeKind::ElementGet(n) => vec![
                Required(Slot::Target, &mut n.target),
                Required(Slot::Element, &mut n.element),
            ],
            NodeKind::Function(n) => vec![
                Optional(Slot::Name, &mut n.name),
                List(Slot::Params, &mut n.params),
                Required(Slot::Body, &mut n.body),
                Optional(Slot::MemberExpr, &mut n.member_expr),
            ],
            NodeKind::FunctionCall(n) => vec![
                Required(Slot::Target, &mut n.target),
                List(Slot::Arguments, &mut n.arguments),
            ],
            NodeKind::New(n) => vec![
                Required(Slot::Target, &mut n.target),
                List(Slot::Arguments, &mut n.arguments),
                Optional(Slot::Initializer, &mut n.initializer),
            ],
            NodeKind::Block(n) | NodeKind::Script(n) => {
                vec![List(Slot::Statements, &mut n.statements)]
            }
            NodeKind::Switch(n) => vec![
                Required(Slot::Discriminant, &mut n.discriminant),
                List(Slot::Cases, &mut n.cases),
            ],
            NodeKind::SwitchCase(n) => vec![
                Optional(Slot::Expression, &mut n.expression),
                List(Slot::Statements, &mut n.statements),
            ],
            NodeKind::Return(n) => vec![Optional(Slot::Value, &mut n.value)],
            NodeKind::Throw(n) => vec![Required(Slot::Expression, &mut n.expression)],
            NodeKind::Yield(n) => vec![Optional(Slot::Value, &mut n.value)],
            NodeKind::While(n) => vec![
                Required(Slot::Condition, &mut n.condition),
                Required(Slot::Body, &mut n.body),
            ],
            NodeKind::With(n) => vec![
                Required(Slot::Object, &mut n.object),
                Required(Slot::Statement, &mut n.statement),
            ],
            NodeKind::VariableDeclaration(n) => {
                vec![List(Slot::Declarators, &mut n.declarators)]
            }
            NodeKind::VariableInitializer(n) => vec![
                Required(Slot::Target, &mut n.target),
                Optional(Slot::Initializer, &mut n.initializer),
            ],
            NodeKind::Unary(n) => vec![Required(Slot::Operand, &mut n.operand)],
            NodeKind::Parenthesized(n) => vec![Required(Slot::Inner, &mut n.inner)],
            NodeKind::ExpressionStatement(n) => {
                vec![Required(Slot::Expression, &mut n.expression)]
            }
            NodeKind::ObjectLiteral(n) => vec![List(Slot::Properties, &mut n.properties)],
            NodeKind::ObjectProperty(n) => vec![
                Required(Slot::Key, &mut n.key),
                Required(Slot::Value, &mut n.value),
            ],
            NodeKind::KeywordLiteral(_)
            | NodeKind::Empty
            | NodeKind::Name(_)
            | NodeKind::NumberLiteral(_)
            | NodeKind::StringLiteral(_) => Vec::new(),
        }
    }

    /// Whether the node stands in statement position.
    #[must_use]
    pub fn is_statement(&self) -> bool {
        match self {
            NodeKind::Block(_)
            | NodeKind::Script(_)
            | NodeKind::Switch(_)
            | NodeKind::SwitchCase(_)
            | NodeKind::Return(_)
            | NodeKind::Throw(_)
            | NodeKind::Yield(_)
            | NodeKind::While(_)
            | NodeKind::With(_)
            | NodeKind::ExpressionStatement(_) => true,
            NodeKind::VariableDeclaration(n) => n.is_statement,
            NodeKind::Function(n) => n.function_type == FunctionType::Statement,
            _ => false,
        }
    }

    /// Operator token of infix, assignment and unary nodes.
    #[must_use]
    pub fn operator(&self) -> Option<Token> {
        match self {
            NodeKind::Assignment(n) | NodeKind::Infix(n) => Some(n.operator),
            NodeKind::Unary(n) => Some(n.operator),
            _ => None,
        }
    }
}

/// One arena slot: shared attributes plus the variant payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) id: u32,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) kind: NodeKind,
    pub change: ChangeInfo,
    /// When set, composite bounds are left alone on structural edits.
    pub fixed_position: bool,
}

impl Node {
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn is_moved(&self) -> bool {
        self.change.moved
    }
}
