//! Per-run analysis state.
//!
//! Everything mutable lives here and is threaded through the interpreter by
//! reference, so independent analyses never share state.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::history::{History, Telemetry};
use crate::modules::ModuleCache;
use crate::syntax::NodeId;
use crate::values::{subtype_bindings, ValueSet};

/// Counters kept during interpretation.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct AnalysisStats {
    /// Unknown values produced, a rough imprecision measure.
    pub unknown_values: usize,
    /// Call expressions analyzed, counting every re-analysis.
    pub calls_analyzed: usize,
    /// Modules located, parsed and interpreted for import statements.
    pub modules_loaded: usize,
}

/// Mutable state of one analysis run.
#[derive(Debug)]
pub struct AnalysisSession {
    pub config: AnalysisConfig,
    pub history: History,
    pub telemetry: Telemetry,
    pub modules: ModuleCache,
    /// Source text per analyzed file, for line rendering in reports.
    pub sources: HashMap<PathBuf, String>,
    pub stats: AnalysisStats,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig) -> AnalysisSession {
        AnalysisSession {
            config,
            history: History::new(),
            telemetry: Telemetry::new(),
            modules: ModuleCache::new(),
            sources: HashMap::new(),
            stats: AnalysisStats::default(),
        }
    }
}

/// One in-flight call: the call site plus the parameter bindings it entered
/// with.
#[derive(Clone, Debug)]
pub struct Frame {
    pub site: NodeId,
    pub signature: Vec<(String, ValueSet)>,
}

/// Persistent stack of in-flight calls, passed down through the interpreter
/// by value. Cloning shares structure, so pushing in one branch never leaks
/// into another.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: im::Vector<Frame>,
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack::default()
    }

    pub fn push(&self, site: NodeId, signature: Vec<(String, ValueSet)>) -> CallStack {
        let mut frames = self.frames.clone();
        frames.push_back(Frame { site, signature });
        CallStack { frames }
    }

    /// The recursion guard: is a call to the same site already in flight
    /// with bindings that cover the current ones?
    pub fn seen(&self, site: &NodeId, signature: &[(String, ValueSet)]) -> bool {
        self.frames
            .iter()
            .any(|f| &f.site == site && subtype_bindings(signature, &f.signature))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Literal, Value};
    use std::path::Path;

    fn site() -> NodeId {
        let body = crate::syntax::parse_module("f()\n", Path::new("<test>")).unwrap();
        NodeId::of(Path::new("<test>"), &body[0])
    }

    fn sig(values: &[i64]) -> Vec<(String, ValueSet)> {
        vec![(
            "x".to_string(),
            values
                .iter()
                .map(|i| Value::Prim(Literal::Int(*i)))
                .collect(),
        )]
    }

    #[test]
    fn guard_fires_on_covered_bindings() {
        let stack = CallStack::new().push(site(), sig(&[1, 2]));
        assert!(stack.seen(&site(), &sig(&[1])));
        assert!(stack.seen(&site(), &sig(&[1, 2])));
    }

    #[test]
    fn guard_passes_on_new_values() {
        let stack = CallStack::new().push(site(), sig(&[1]));
        assert!(!stack.seen(&site(), &sig(&[2])));
        assert!(!stack.seen(&site(), &sig(&[1, 2])));
    }

    #[test]
    fn pushing_is_persistent() {
        let base = CallStack::new();
        let pushed = base.push(site(), sig(&[1]));
        assert_eq!(base.depth(), 0);
        assert_eq!(pushed.depth(), 1);
        assert!(!base.seen(&site(), &sig(&[1])));
    }
}
