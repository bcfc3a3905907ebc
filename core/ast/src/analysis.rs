//! Boundary to the external analyses whose results are embedded in the
//! exported JSON of blocks, functions, `new` expressions, `while` loops and
//! variable declarations.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::arena::Arena;
use crate::clone::CloneMap;
use crate::nodes::NodeRef;

/// Source of the `criteria` and `dependencies` payloads.
///
/// Implementations only get shared access to the tree. Returning
/// `Value::Null` is treated as an empty array.
pub trait AnalysisProvider {
    fn criteria(&self, arena: &Arena, node: NodeRef) -> Value;
    fn dependencies(&self, arena: &Arena, node: NodeRef) -> Value;
}

/// Provider used when no analysis ran: both payloads are empty arrays.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAnalysis;

impl AnalysisProvider for NoAnalysis {
    fn criteria(&self, _: &Arena, _: NodeRef) -> Value {
        Value::Array(Vec::new())
    }

    fn dependencies(&self, _: &Arena, _: NodeRef) -> Value {
        Value::Array(Vec::new())
    }
}

/// Handle-keyed store of precomputed analysis payloads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisTable {
    criteria: FxHashMap<NodeRef, Value>,
    dependencies: FxHashMap<NodeRef, Value>,
}

impl AnalysisTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_criteria(&mut self, node: NodeRef, criteria: Value) {
        self.criteria.insert(node, criteria);
    }

    pub fn set_dependencies(&mut self, node: NodeRef, dependencies: Value) {
        self.dependencies.insert(node, dependencies);
    }

    /// Copies the entries of cloned nodes to their copies. Entries of the
    /// source nodes are kept.
    pub fn carry_over(&mut self, map: &CloneMap) {
        for (source, copy) in map.iter() {
            if let Some(value) = self.criteria.get(&source).cloned() {
                self.criteria.insert(copy, value);
            }
            if let Some(value) = self.dependencies.get(&source).cloned() {
                self.dependencies.insert(copy, value);
            }
        }
    }
}

fn or_empty(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Array(Vec::new()),
        Some(value) => value.clone(),
    }
}

impl AnalysisProvider for AnalysisTable {
    fn criteria(&self, _: &Arena, node: NodeRef) -> Value {
        or_empty(self.criteria.get(&node))
    }

    fn dependencies(&self, _: &Arena, node: NodeRef) -> Value {
        or_empty(self.dependencies.get(&node))
    }
}
