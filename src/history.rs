//! Analysis history: accumulated value-sets per node and per name, plus the
//! method-call telemetry consumed by downstream tooling.

use std::collections::HashMap;

use crate::env::Env;
use crate::syntax::NodeId;
use crate::values::{union, Diagnostic, Value, ValueSet};

/// Append-only side table of analysis results.
///
/// Recording unions with whatever was already there, so a node visited on
/// several paths (or several loop passes) accumulates every value it was
/// ever given.
#[derive(Debug, Default)]
pub struct History {
    by_node: HashMap<NodeId, ValueSet>,
    by_name: HashMap<String, ValueSet>,
}

impl History {
    pub fn new() -> History {
        History::default()
    }

    pub fn record(&mut self, node: NodeId, values: ValueSet) {
        match self.by_node.remove(&node) {
            Some(existing) => {
                self.by_node.insert(node, union([existing, values]));
            }
            None => {
                self.by_node.insert(node, values);
            }
        }
    }

    /// Record under both the node and the surface name it was bound to.
    pub fn record_name(&mut self, name: &str, node: NodeId, values: ValueSet) {
        self.record(node, values.clone());
        match self.by_name.remove(name) {
            Some(existing) => {
                self.by_name.insert(name.to_string(), union([existing, values]));
            }
            None => {
                self.by_name.insert(name.to_string(), values);
            }
        }
    }

    pub fn for_node(&self, node: &NodeId) -> Option<&ValueSet> {
        self.by_node.get(node)
    }

    pub fn for_name(&self, name: &str) -> Option<&ValueSet> {
        self.by_name.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &ValueSet)> {
        self.by_node.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = (&String, &ValueSet)> {
        self.by_name.iter()
    }

    /// Every diagnostic value recorded anywhere, deduplicated and ordered
    /// by source position.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = Vec::new();
        for set in self.by_node.values() {
            for value in set.iter() {
                if let Value::Diag(d) = value {
                    if !out.contains(d) {
                        out.push(d.clone());
                    }
                }
            }
        }
        out.sort_by(|a, b| {
            (&a.node, a.kind, &a.detail).cmp(&(&b.node, b.kind, &b.detail))
        });
        out
    }
}

/// One recorded method invocation on an instance.
#[derive(Clone, Debug)]
pub struct MethodInvocation {
    /// Arguments the receiving instance was constructed with.
    pub ctor_args: Vec<ValueSet>,
    /// Positional arguments of this call, bound-method wrappers flattened.
    pub call_args: Vec<ValueSet>,
    /// Caller environment at the call site.
    pub env: Env,
    /// Names of the candidate methods behind the attribute.
    pub methods: Vec<String>,
}

/// Per-class record of observed method invocations, in call order.
#[derive(Debug, Default)]
pub struct Telemetry {
    by_class: HashMap<String, Vec<MethodInvocation>>,
}

impl Telemetry {
    pub fn new() -> Telemetry {
        Telemetry::default()
    }

    pub fn record(&mut self, class: &str, invocation: MethodInvocation) {
        self.by_class
            .entry(class.to_string())
            .or_default()
            .push(invocation);
    }

    pub fn for_class(&self, class: &str) -> &[MethodInvocation] {
        self.by_class.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn classes(&self) -> impl Iterator<Item = (&String, &Vec<MethodInvocation>)> {
        self.by_class.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }
}
