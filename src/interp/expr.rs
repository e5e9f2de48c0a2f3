//! Expression evaluation.
//!
//! Expressions evaluate to value-sets. Anything the analysis does not model
//! (comprehensions, comparisons, arithmetic beyond string formatting)
//! degrades to an unknown tagged with the node; nothing raises.

use std::path::Path;

use rustpython_parser::ast;

use crate::builtins;
use crate::env::Env;
use crate::session::CallStack;
use crate::syntax::NodeId;
use crate::values::{
    BoundMethodValue, ClosureValue, DiagKind, Diagnostic, DictEntry, DictValue, FuncDef, Literal,
    SeqValue, Value, ValueSet,
};

use super::Interp;

impl Interp<'_> {
    pub(crate) fn infer_expr(
        &mut self,
        expr: &ast::Expr,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        match expr {
            ast::Expr::Constant(c) => self.infer_constant(c, file),
            ast::Expr::Name(n) => self.infer_name(n, file, env),
            ast::Expr::Attribute(a) => self.infer_attribute(a, file, env, stack),
            ast::Expr::Call(c) => self.invoke(c, file, env, stack),
            ast::Expr::Lambda(l) => self.infer_lambda(l, file, env, stack),
            ast::Expr::BinOp(b) => self.infer_binop(b, file, env, stack),
            ast::Expr::List(l) => self.infer_seq_literal(&l.elts, file, env, stack),
            ast::Expr::Tuple(t) => self.infer_seq_literal(&t.elts, file, env, stack),
            ast::Expr::Dict(d) => self.infer_dict_literal(d, file, env, stack),
            ast::Expr::Subscript(s) => self.infer_subscript(s, file, env, stack),
            other => {
                let node = NodeId::of(file, other);
                ValueSet::unit(self.unknown(node))
            }
        }
    }

    fn infer_constant(&mut self, c: &ast::ExprConstant, file: &Path) -> ValueSet {
        match &c.value {
            // a folded constant tuple is still a sequence
            ast::Constant::Tuple(items) => {
                let elems = items
                    .iter()
                    .map(|item| match Literal::from_constant(item) {
                        Some(lit) => ValueSet::unit(Value::Prim(lit)),
                        None => ValueSet::unit(self.unknown(NodeId::of(file, c))),
                    })
                    .collect();
                ValueSet::unit(Value::Seq(SeqValue::new(elems)))
            }
            value => match Literal::from_constant(value) {
                Some(lit) => ValueSet::unit(Value::Prim(lit)),
                None => ValueSet::unit(self.unknown(NodeId::of(file, c))),
            },
        }
    }

    /// Resolve a name: the environment first, then the builtin table. Every
    /// outcome, including the unknown for an unresolved name, is recorded in
    /// the history.
    fn infer_name(&mut self, n: &ast::ExprName, file: &Path, env: &Env) -> ValueSet {
        let node = NodeId::of(file, n);
        let resolved = match env.lookup(n.id.as_str()) {
            Some(set) => set.clone(),
            None => match builtins::probe(n.id.as_str()) {
                Some(builtin) => ValueSet::unit(builtin),
                None => ValueSet::unit(self.unknown(node.clone())),
            },
        };
        self.session
            .history
            .record_name(n.id.as_str(), node, resolved.clone());
        resolved
    }

    fn infer_lambda(
        &mut self,
        l: &ast::ExprLambda,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let closure = ClosureValue::new(FuncDef::lambda(l, file));
        let _ = closure.env.set(env.clone());
        let defaults: Vec<ValueSet> = l
            .args
            .defaults()
            .map(|d| self.infer_expr(d, file, env, stack))
            .collect();
        if !defaults.is_empty() {
            *closure.defaults.borrow_mut() = defaults;
        }
        ValueSet::unit(Value::Closure(closure))
    }

    // ==================== Attributes ====================

    fn infer_attribute(
        &mut self,
        a: &ast::ExprAttribute,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let node = NodeId::of(file, a);
        let base = self.infer_expr(&a.value, file, env, stack);
        if base.is_empty() {
            return ValueSet::unit(self.unknown(node));
        }
        self.get_attribute(&base, a.attr.as_str(), node)
    }

    /// Look an attribute up on every candidate receiver. Classes and
    /// instances consult their attribute maps, dictionaries synthesize
    /// native methods, everything else is a diagnostic.
    pub(crate) fn get_attribute(
        &mut self,
        receivers: &ValueSet,
        attr: &str,
        node: NodeId,
    ) -> ValueSet {
        let mut out = ValueSet::new();
        for receiver in receivers.iter() {
            match receiver {
                Value::Class(c) => match c.attr(attr) {
                    Some(set) => out.extend(&set),
                    None => out.push(Value::Diag(Diagnostic::new(
                        DiagKind::UnknownAttribute,
                        format!("no attribute {attr} on class {}", c.name),
                        node.clone(),
                    ))),
                },
                Value::Instance(i) => match i.attr(attr) {
                    Some(set) => out.extend(&set),
                    None => out.push(Value::Diag(Diagnostic::new(
                        DiagKind::UnknownAttribute,
                        format!("no attribute {attr} on instance of {}", i.class.name),
                        node.clone(),
                    ))),
                },
                Value::Dict(d) => match builtins::dict_method(attr) {
                    Some(tag) => out.push(Value::BoundMethod(BoundMethodValue::new(
                        vec![Value::Builtin(tag)],
                        Value::Dict(d.clone()),
                    ))),
                    None => out.push(Value::Diag(Diagnostic::new(
                        DiagKind::UnknownAttribute,
                        format!("no attribute {attr} on dict"),
                        node.clone(),
                    ))),
                },
                other => out.push(Value::Diag(Diagnostic::new(
                    DiagKind::UnknownAttribute,
                    format!("cannot read attribute {attr} of {other}"),
                    node.clone(),
                ))),
            }
        }
        out
    }

    // ==================== Operators ====================

    /// Binary operators are opaque except `%` on strings, which models the
    /// common formatting idiom.
    fn infer_binop(
        &mut self,
        b: &ast::ExprBinOp,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let node = NodeId::of(file, b);
        if !matches!(b.op, ast::Operator::Mod) {
            return ValueSet::unit(self.unknown(node));
        }
        let left = self.infer_expr(&b.left, file, env, stack);
        let right = self.infer_expr(&b.right, file, env, stack);
        let mut out = ValueSet::new();
        for l in left.iter() {
            match l {
                Value::Prim(Literal::Str(template)) => {
                    for r in right.iter() {
                        match r {
                            Value::Prim(Literal::Str(value)) => {
                                out.push(Value::Prim(Literal::Str(percent_format(
                                    template, value,
                                ))));
                            }
                            // formatting with an unknown keeps the template
                            Value::Unknown(_) => {
                                out.push(Value::Prim(Literal::Str(template.clone())));
                            }
                            _ => {}
                        }
                    }
                }
                _ => {
                    out.push(self.unknown(node.clone()));
                }
            }
        }
        out
    }

    // ==================== Containers ====================

    fn infer_seq_literal(
        &mut self,
        elts: &[ast::Expr],
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let elems: Vec<ValueSet> = elts
            .iter()
            .map(|e| self.infer_expr(e, file, env, stack))
            .collect();
        ValueSet::unit(Value::Seq(SeqValue::new(elems)))
    }

    /// Dictionary literals: literal keys overwrite earlier entries for the
    /// same key, abstract keys each get their own entry.
    fn infer_dict_literal(
        &mut self,
        d: &ast::ExprDict,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let mut entries: Vec<DictEntry> = Vec::new();
        for (key, value) in d.keys.iter().zip(d.values.iter()) {
            let Some(key) = key else {
                // a `**spread` entry: evaluate for effect, contents unknown
                let _ = self.infer_expr(value, file, env, stack);
                continue;
            };
            let key_set = self.infer_expr(key, file, env, stack);
            let value_set = self.infer_expr(value, file, env, stack);
            for key_value in key_set.iter() {
                match key_value {
                    Value::Prim(_) => {
                        match entries.iter_mut().find(|e| &e.key == key_value) {
                            Some(existing) => existing.values = value_set.clone(),
                            None => entries.push(DictEntry {
                                key: key_value.clone(),
                                values: value_set.clone(),
                            }),
                        }
                    }
                    other => entries.push(DictEntry {
                        key: other.clone(),
                        values: value_set.clone(),
                    }),
                }
            }
        }
        ValueSet::unit(Value::Dict(DictValue::new(entries)))
    }

    /// Subscript reads: dictionary receivers answer with their pooled
    /// values, like `get` with no default. Other receivers are opaque.
    fn infer_subscript(
        &mut self,
        s: &ast::ExprSubscript,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let node = NodeId::of(file, s);
        let receivers = self.infer_expr(&s.value, file, env, stack);
        let _ = self.infer_expr(&s.slice, file, env, stack);
        let mut out = ValueSet::new();
        for receiver in receivers.iter() {
            match receiver {
                Value::Dict(d) => out.extend(&d.pooled_values()),
                _ => out.push(self.unknown(node.clone())),
            }
        }
        if out.is_empty() {
            out.push(self.unknown(node));
        }
        out
    }
}

/// Substitute the first `%s` in a template. No placeholder means the
/// template passes through unchanged.
fn percent_format(template: &str, value: &str) -> String {
    template.replacen("%s", value, 1)
}
