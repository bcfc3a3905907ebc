//! Export to the Esprima-shaped JSON schema consumed by downstream tools.
//!
//! Every object starts with `type` and carries `change` followed by either
//! `moved` (a stringified boolean) or `change-noprop`, depending on the
//! variant. Parenthesized expressions are erased. A missing required child
//! anywhere in the subtree fails the whole export.
//!
//! Objects are assembled bottom-up from an explicit work stack, so the depth
//! of the tree is not limited by the call stack.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::AnalysisProvider;
use crate::arena::Arena;
use crate::config::ExportOptions;
use crate::errors::{AstError, AstResult};
use crate::nodes::{Keyword, Node, NodeKind, NodeRef, Slot};
use crate::operators::{infix_form, unary_form};

/// Renders the subtree rooted at `node`.
///
/// # Errors
///
/// Returns [`crate::errors::AstError::MalformedTreeAccess`] if a required
/// child is absent anywhere in the subtree.
pub fn to_external(
    arena: &Arena,
    node: NodeRef,
    provider: &dyn AnalysisProvider,
) -> AstResult<Value> {
    debug!(%node, "exporting subtree");
    Exporter {
        arena,
        provider,
        done: FxHashMap::default(),
    }
    .run(node)
}

/// Renders the subtree rooted at `node` as JSON text.
///
/// # Errors
///
/// Same as [`to_external`].
pub fn to_json_string(
    arena: &Arena,
    node: NodeRef,
    provider: &dyn AnalysisProvider,
    options: ExportOptions,
) -> AstResult<String> {
    let value = to_external(arena, node, provider)?;
    Ok(if options.pretty {
        format!("{value:#}")
    } else {
        value.to_string()
    })
}

enum Task {
    Enter(NodeRef),
    Exit(NodeRef),
}

struct Exporter<'a> {
    arena: &'a Arena,
    provider: &'a dyn AnalysisProvider,
    // Rendered children waiting for their parent's `Exit`.
    done: FxHashMap<NodeRef, Value>,
}

enum Trailer {
    Moved,
    NoProp,
}

impl Exporter<'_> {
    fn run(mut self, root: NodeRef) -> AstResult<Value> {
        let mut tasks = vec![Task::Enter(root)];
        while let Some(task) = tasks.pop() {
            match task {
                Task::Enter(node) => {
                    let children = self.arena.children(node)?;
                    tasks.push(Task::Exit(node));
                    tasks.extend(children.into_iter().rev().map(Task::Enter));
                }
                Task::Exit(node) => {
                    let value = self.node(node)?;
                    self.done.insert(node, value);
                }
            }
        }
        self.take(root)
    }

    /// Builds the object of `node` from the already rendered children.
    fn node(&mut self, node: NodeRef) -> AstResult<Value> {
        let arena = self.arena;
        let entry = arena.get(node)?;
        let mut object = Map::new();
        let trailer = match &entry.kind {
            NodeKind::Assignment(n) => {
                let form = infix_form(n.operator);
                object.insert("type".into(), "AssignmentExpression".into());
                object.insert("operator".into(), form.operator.into());
                object.insert("left".into(), self.required(node, Slot::Left)?);
                object.insert("right".into(), self.required(node, Slot::Right)?);
                Trailer::Moved
            }
            NodeKind::Infix(n) => {
                let form = infix_form(n.operator);
                if form.is_fallback {
                    warn!(
                        %node,
                        operator = %n.operator,
                        "no external symbol for infix operator"
                    );
                }
                object.insert("type".into(), form.node_type.into());
                object.insert("operator".into(), form.operator.into());
                object.insert("left".into(), self.required(node, Slot::Left)?);
                object.insert("right".into(), self.required(node, Slot::Right)?);
                Trailer::NoProp
            }
            NodeKind::Conditional(_) => {
                object.insert("type".into(), "ConditionalExpression".into());
                object.insert("test".into(), self.required(node, Slot::Test)?);
                object.insert("consequent".into(), self.required(node, Slot::Consequent)?);
                object.insert("alternate".into(), self.required(node, Slot::Alternate)?);
                Trailer::NoProp
            }
            NodeKind::ElementGet(_) => {
                object.insert("type".into(), "MemberExpression".into());
                object.insert("computed".into(), true.into());
                object.insert("object".into(), self.required(node, Slot::Target)?);
                object.insert("property".into(), self.required(node, Slot::Element)?);
                Trailer::Moved
            }
            NodeKind::Function(n) => {
                object.insert("type".into(), "FunctionDeclaration".into());
                object.insert("id".into(), self.function_id(entry, n.name)?);
                object.insert("params".into(), self.list(node, Slot::Params)?);
                object.insert("body".into(), self.required(node, Slot::Body)?);
                object.insert("generator".into(), n.is_generator.into());
                object.insert("expression".into(), n.is_expression_closure.into());
                object.insert("async".into(), false.into());
                if let Some(member) = n.member_expr {
                    self.take(member)?;
                }
                self.analysis(&mut object, node);
                Trailer::NoProp
            }
            NodeKind::FunctionCall(_) => {
                object.insert("type".into(), "CallExpression".into());
                object.insert("callee".into(), self.required(node, Slot::Target)?);
                object.insert("arguments".into(), self.list(node, Slot::Arguments)?);
                Trailer::NoProp
            }
            NodeKind::New(_) => {
                object.insert("type".into(), "NewExpression".into());
                object.insert("callee".into(), self.required(node, Slot::Target)?);
                object.insert("arguments".into(), self.list(node, Slot::Arguments)?);
                self.analysis(&mut object, node);
                Trailer::NoProp
            }
            NodeKind::Block(_) => {
                object.insert("type".into(), "BlockStatement".into());
                object.insert("body".into(), self.list(node, Slot::Statements)?);
                self.analysis(&mut object, node);
                Trailer::NoProp
            }
            NodeKind::Script(_) => {
                object.insert("type".into(), "Program".into());
                object.insert("body".into(), self.list(node, Slot::Statements)?);
                object.insert("sourceType".into(), "script".into());
                Trailer::NoProp
            }
            NodeKind::Switch(_) => {
                object.insert("type".into(), "SwitchStatement".into());
                object.insert("discriminant".into(), self.required(node, Slot::Discriminant)?);
                object.insert("cases".into(), self.list(node, Slot::Cases)?);
                Trailer::Moved
            }
            NodeKind::SwitchCase(_) => {
                object.insert("type".into(), "SwitchCase".into());
                object.insert("test".into(), self.optional(node, Slot::Expression)?);
                object.insert("consequent".into(), self.list(node, Slot::Statements)?);
                Trailer::Moved
            }
            NodeKind::Return(_) => {
                object.insert("type".into(), "ReturnStatement".into());
                object.insert("argument".into(), self.optional(node, Slot::Value)?);
                Trailer::Moved
            }
            NodeKind::Throw(_) => {
                object.insert("type".into(), "ThrowStatement".into());
                object.insert("argument".into(), self.required(node, Slot::Expression)?);
                Trailer::NoProp
            }
            NodeKind::Yield(_) => {
                object.insert("type".into(), "YieldExpression".into());
                object.insert("expression".into(), self.optional(node, Slot::Value)?);
                object.insert("delegate".into(), false.into());
                Trailer::Moved
            }
            NodeKind::While(_) => {
                object.insert("type".into(), "WhileStatement".into());
                object.insert("test".into(), self.required(node, Slot::Condition)?);
                object.insert("body".into(), self.required(node, Slot::Body)?);
                self.analysis(&mut object, node);
                Trailer::NoProp
            }
            NodeKind::With(_) => {
                object.insert("type".into(), "WithStatement".into());
                object.insert("object".into(), self.required(node, Slot::Object)?);
                object.insert("body".into(), self.required(node, Slot::Statement)?);
                Trailer::NoProp
            }
            NodeKind::VariableDeclaration(n) => {
                object.insert("type".into(), "VariableDeclaration".into());
                object.insert("declarations".into(), self.list(node, Slot::Declarators)?);
                object.insert("kind".into(), n.kind.as_str().into());
                self.analysis(&mut object, node);
                Trailer::NoProp
            }
            NodeKind::VariableInitializer(_) => {
                object.insert("type".into(), "VariableDeclarator".into());
                object.insert("id".into(), self.required(node, Slot::Target)?);
                object.insert("init".into(), self.optional(node, Slot::Initializer)?);
                Trailer::NoProp
            }
            NodeKind::Unary(n) => {
                let form = unary_form(n.operator);
                if form.is_fallback {
                    warn!(
                        %node,
                        operator = %n.operator,
                        "no external symbol for unary operator"
                    );
                }
                object.insert("type".into(), form.node_type.into());
                object.insert("operator".into(), form.operator.into());
                object.insert("argument".into(), self.required(node, Slot::Operand)?);
                object.insert("prefix".into(), form.prefix.into());
                Trailer::NoProp
            }
            NodeKind::KeywordLiteral(n) => {
                keyword(&mut object, n.keyword);
                Trailer::Moved
            }
            NodeKind::Parenthesized(_) => {
                return self.required(node, Slot::Inner);
            }
            NodeKind::Empty => {
                object.insert("type".into(), "EmptyStatement".into());
                Trailer::Moved
            }
            NodeKind::Name(n) => {
                object.insert("type".into(), "Identifier".into());
                object.insert("name".into(), n.identifier.clone().into());
                Trailer::Moved
            }
            NodeKind::NumberLiteral(n) => {
                object.insert("type".into(), "Literal".into());
                object.insert("value".into(), number(n.value));
                object.insert("raw".into(), n.raw.clone().into());
                Trailer::Moved
            }
            NodeKind::StringLiteral(n) => {
                object.insert("type".into(), "Literal".into());
                object.insert("value".into(), n.value.clone().into());
                object.insert("raw".into(), format!("{q}{}{q}", n.value, q = n.quote).into());
                Trailer::Moved
            }
            NodeKind::ExpressionStatement(_) => {
                object.insert("type".into(), "ExpressionStatement".into());
                object.insert("expression".into(), self.required(node, Slot::Expression)?);
                Trailer::NoProp
            }
            NodeKind::ObjectLiteral(_) => {
                object.insert("type".into(), "ObjectExpression".into());
                object.insert("properties".into(), self.list(node, Slot::Properties)?);
                Trailer::Moved
            }
            NodeKind::ObjectProperty(_) => {
                object.insert("type".into(), "Property".into());
                object.insert("key".into(), self.required(node, Slot::Key)?);
                object.insert("value".into(), self.required(node, Slot::Value)?);
                object.insert("kind".into(), "init".into());
                object.insert("computed".into(), false.into());
                object.insert("method".into(), false.into());
                object.insert("shorthand".into(), false.into());
                Trailer::Moved
            }
        };
        annotate(&mut object, entry, &trailer);
        Ok(Value::Object(object))
    }

    fn take(&mut self, child: NodeRef) -> AstResult<Value> {
        self.done.remove(&child).ok_or(AstError::UnknownNode(child))
    }

    fn required(&mut self, node: NodeRef, slot: Slot) -> AstResult<Value> {
        let child = self.arena.required_child(node, slot)?;
        self.take(child)
    }

    fn optional(&mut self, node: NodeRef, slot: Slot) -> AstResult<Value> {
        match self.arena.child(node, slot)? {
            Some(child) => self.take(child),
            None => Ok(Value::Null),
        }
    }

    fn list(&mut self, node: NodeRef, slot: Slot) -> AstResult<Value> {
        let arena = self.arena;
        arena
            .child_list(node, slot)?
            .iter()
            .map(|child| self.take(*child))
            .collect::<AstResult<Vec<_>>>()
            .map(Value::Array)
    }

    /// The function's name as an identifier carrying the function's own
    /// change labels, or `null` for an anonymous function.
    fn function_id(&mut self, function: &Node, name: Option<NodeRef>) -> AstResult<Value> {
        let Some(name) = name else {
            return Ok(Value::Null);
        };
        // The generic rendering of the name node is not used.
        self.take(name)?;
        let NodeKind::Name(identifier) = &self.arena.get(name)?.kind else {
            return Ok(Value::Null);
        };
        if identifier.identifier.is_empty() {
            return Ok(Value::Null);
        }
        let mut object = Map::new();
        object.insert("type".into(), "Identifier".into());
        object.insert("name".into(), identifier.identifier.clone().into());
        object.insert("change".into(), function.change.change.as_str().into());
        object.insert(
            "change-noprop".into(),
            function.change.change_noprop.as_str().into(),
        );
        Ok(Value::Object(object))
    }

    fn analysis(&self, object: &mut Map<String, Value>, node: NodeRef) {
        let criteria = self.provider.criteria(self.arena, node);
        let dependencies = self.provider.dependencies(self.arena, node);
        object.insert("criteria".into(), non_null(criteria));
        object.insert("dependencies".into(), non_null(dependencies));
    }
}

fn non_null(value: Value) -> Value {
    if value.is_null() {
        Value::Array(Vec::new())
    } else {
        value
    }
}

fn annotate(object: &mut Map<String, Value>, entry: &Node, trailer: &Trailer) {
    object.insert("change".into(), entry.change.change.as_str().into());
    match trailer {
        Trailer::Moved => {
            object.insert("moved".into(), entry.change.moved.to_string().into());
        }
        Trailer::NoProp => {
            object.insert(
                "change-noprop".into(),
                entry.change.change_noprop.as_str().into(),
            );
        }
    }
}

fn keyword(object: &mut Map<String, Value>, keyword: Keyword) {
    let (node_type, literal) = match keyword {
        Keyword::This => ("ThisExpression", None),
        Keyword::Debugger => ("DebuggerStatement", None),
        Keyword::True => ("Literal", Some((Value::Bool(true), "true"))),
        Keyword::False => ("Literal", Some((Value::Bool(false), "false"))),
        Keyword::Null => ("Literal", Some((Value::Null, "null"))),
    };
    object.insert("type".into(), node_type.into());
    if let Some((value, raw)) = literal {
        object.insert("value".into(), value);
        object.insert("raw".into(), raw.into());
    }
}

/// Integral values render without a fraction; non-finite values as `null`.
#[allow(clippy::cast_possible_truncation)]
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}
