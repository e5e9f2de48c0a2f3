//! The abstract interpreter.
//!
//! Interpretation walks statement sequences recursively: each statement
//! produces the set of values the enclosing function could return through
//! it, with a continuation sentinel marking fall-through, plus the
//! environment the rest of the block runs in. Branches fork the environment,
//! interpret both arms against pre-bound copies, and join.

mod call;
mod expr;

use std::path::Path;
use std::rc::Rc;

use rustpython_parser::ast;

use crate::env::Env;
use crate::modules::{self, ModuleRec};
use crate::session::{AnalysisSession, CallStack};
use crate::syntax::NodeId;
use crate::values::{
    union, AttrMap, ClassKind, ClassValue, ClosureValue, DiagKind, Diagnostic, FuncDef,
    InstanceValue, Literal, Value, ValueSet,
};

/// The interpreter proper: a thin wrapper around the mutable session.
pub struct Interp<'a> {
    pub(crate) session: &'a mut AnalysisSession,
}

impl<'a> Interp<'a> {
    pub fn new(session: &'a mut AnalysisSession) -> Interp<'a> {
        Interp { session }
    }

    /// Interpret a whole module body in a fresh scope.
    pub fn infer_module(&mut self, body: &[ast::Stmt], file: &Path) -> (ValueSet, Env) {
        self.infer_block(body, file, Env::new(), &CallStack::new())
    }

    /// Interpret one block: pre-bind its definitions, then run the
    /// statements in order.
    pub(crate) fn infer_block(
        &mut self,
        stmts: &[ast::Stmt],
        file: &Path,
        env: Env,
        stack: &CallStack,
    ) -> (ValueSet, Env) {
        let env = self.close_block(stmts, env, file);
        self.infer_seq(stmts, file, env, stack)
    }

    pub(crate) fn unknown(&mut self, node: NodeId) -> Value {
        self.session.stats.unknown_values += 1;
        Value::Unknown(node)
    }

    // ==================== Closing ====================

    /// Pre-bind a block's definitions so forward and mutual references
    /// resolve: assignment targets get empty sets, `def`s get placeholder
    /// closures, `class`es get fully-built class values.
    fn close_block(&mut self, stmts: &[ast::Stmt], env: Env, file: &Path) -> Env {
        let def_names: Vec<&str> = stmts
            .iter()
            .filter_map(|s| match s {
                ast::Stmt::FunctionDef(d) => Some(d.name.as_str()),
                ast::Stmt::ClassDef(d) => Some(d.name.as_str()),
                _ => None,
            })
            .collect();

        let mut env = env;
        for name in assigned_names(stmts) {
            if !def_names.contains(&name.as_str()) {
                env = env.extend(name, ValueSet::new());
            }
        }
        for stmt in stmts {
            match stmt {
                ast::Stmt::FunctionDef(def) => {
                    let closure = ClosureValue::new(FuncDef::function(def, file));
                    env = env.extend(
                        def.name.to_string(),
                        ValueSet::unit(Value::Closure(closure)),
                    );
                }
                ast::Stmt::ClassDef(def) => {
                    let class = self.build_class(def, &env, file);
                    env = env.extend(def.name.to_string(), ValueSet::unit(Value::Class(class)));
                }
                _ => {}
            }
        }
        env
    }

    /// Build a class value at close time: inherit from a resolvable single
    /// base, then lay the body's own definitions over it.
    fn build_class(&mut self, def: &ast::StmtClassDef, env: &Env, file: &Path) -> ClassValue {
        let mut attrs = AttrMap::new();
        for base in &def.bases {
            match base {
                // attribute bases (modules, metaprogramming) are beyond the
                // resolution the closing pass can do
                ast::Expr::Attribute(_) => {}
                ast::Expr::Name(n) if n.id.as_str() == "object" => {}
                ast::Expr::Name(n) => match env.lookup(n.id.as_str()).and_then(ValueSet::only) {
                    Some(Value::Class(parent)) => {
                        for (name, values) in parent.attrs.borrow().iter() {
                            attrs.set(name.clone(), values.clone());
                        }
                    }
                    _ => {
                        log::warn!(
                            "cannot resolve base {} of class {}, skipping inheritance",
                            n.id,
                            def.name
                        );
                    }
                },
                _ => {
                    log::warn!("unsupported base expression for class {}", def.name);
                }
            }
        }
        let body_env = self.close_block(&def.body, Env::new(), file);
        for (name, values) in body_env.visible() {
            if !values.is_empty() {
                attrs.set(name, values);
            }
        }
        ClassValue::new(
            def.name.to_string(),
            ClassKind::User,
            attrs,
            NodeId::of(file, def),
        )
    }

    // ==================== Statement sequences ====================

    fn infer_seq(
        &mut self,
        stmts: &[ast::Stmt],
        file: &Path,
        env: Env,
        stack: &CallStack,
    ) -> (ValueSet, Env) {
        let Some((head, rest)) = stmts.split_first() else {
            return (ValueSet::unit(Value::Continuation), env);
        };
        match head {
            ast::Stmt::If(s) => {
                let _ = self.infer_expr(&s.test, file, &env, stack);
                let arm1 = self.infer_block(&s.body, file, env.clone(), stack);
                let arm2 = self.infer_block(&s.orelse, file, env.clone(), stack);
                self.join_branches(arm1, arm2, rest, file, env, stack)
            }
            ast::Stmt::While(s) => {
                let _ = self.infer_expr(&s.test, file, &env, stack);
                let arm1 = self.infer_block(&s.body, file, env.clone(), stack);
                let arm2 = self.infer_block(&s.orelse, file, env.clone(), stack);
                self.join_branches(arm1, arm2, rest, file, env, stack)
            }
            ast::Stmt::For(s) => {
                let iter_set = self.infer_expr(&s.iter, file, &env, stack);
                let bound = match s.target.as_ref() {
                    ast::Expr::Name(_) => flatten_iterable(&iter_set),
                    _ => iter_set,
                };
                let env = self.bind(&s.target, bound, env, file, stack);
                let arm1 = self.infer_block(&s.body, file, env.clone(), stack);
                let arm2 = self.infer_block(&s.orelse, file, env.clone(), stack);
                self.join_branches(arm1, arm2, rest, file, env, stack)
            }
            ast::Stmt::Try(s) => {
                let arm1 = self.infer_block(&s.body, file, env.clone(), stack);
                if s.handlers.is_empty() && s.orelse.is_empty() && !s.finalbody.is_empty() {
                    let arm2 = self.infer_block(&s.finalbody, file, env.clone(), stack);
                    return self.join_branches(arm1, arm2, rest, file, env, stack);
                }
                let arm2 = self.infer_block(&s.orelse, file, env.clone(), stack);
                let mut handler_env = env.clone();
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    let (_effect, next_env) =
                        self.infer_block(&h.body, file, handler_env, stack);
                    handler_env = next_env;
                }
                if !s.finalbody.is_empty() {
                    let _ = self.infer_block(&s.finalbody, file, env.clone(), stack);
                }
                self.join_branches(arm1, arm2, rest, file, env, stack)
            }
            ast::Stmt::With(s) => {
                for item in &s.items {
                    let _ = self.infer_expr(&item.context_expr, file, &env, stack);
                }
                let (body_result, body_env) = self.infer_block(&s.body, file, env, stack);
                let (rest_result, rest_env) = self.infer_seq(rest, file, body_env, stack);
                (union([body_result, rest_result]), rest_env)
            }
            ast::Stmt::Assign(s) => {
                let values = self.infer_expr(&s.value, file, &env, stack);
                let mut env = env;
                for target in &s.targets {
                    env = self.bind(target, values.clone(), env, file, stack);
                }
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::AugAssign(s) => {
                let values = self.infer_expr(&s.value, file, &env, stack);
                let env = self.bind(&s.target, values, env, file, stack);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::AnnAssign(s) => match &s.value {
                Some(value) => {
                    let values = self.infer_expr(value, file, &env, stack);
                    let env = self.bind(&s.target, values, env, file, stack);
                    self.infer_seq(rest, file, env, stack)
                }
                None => self.infer_seq(rest, file, env, stack),
            },
            ast::Stmt::Return(s) => {
                let result = match &s.value {
                    Some(value) => self.infer_expr(value, file, &env, stack),
                    None => ValueSet::unit(Value::Prim(Literal::None)),
                };
                self.flag_unreachable(rest, file);
                (result, env)
            }
            ast::Stmt::FunctionDef(s) => {
                self.define_function(s, &env, file, stack);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::ClassDef(s) => {
                self.define_class(s, &env, file, stack);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Import(s) => {
                let env = self.handle_import(s, env, file);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::ImportFrom(s) => {
                let env = self.handle_import_from(s, env, file);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Expr(s) => {
                let _ = self.infer_expr(&s.value, file, &env, stack);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Assert(s) => {
                let _ = self.infer_expr(&s.test, file, &env, stack);
                if let Some(msg) = &s.msg {
                    let _ = self.infer_expr(msg, file, &env, stack);
                }
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Raise(s) => {
                if let Some(exc) = &s.exc {
                    let _ = self.infer_expr(exc, file, &env, stack);
                }
                if let Some(cause) = &s.cause {
                    let _ = self.infer_expr(cause, file, &env, stack);
                }
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Delete(s) => {
                for target in &s.targets {
                    let _ = self.infer_expr(target, file, &env, stack);
                }
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Match(s) => {
                let _ = self.infer_expr(&s.subject, file, &env, stack);
                self.infer_seq(rest, file, env, stack)
            }
            ast::Stmt::Pass(_)
            | ast::Stmt::Break(_)
            | ast::Stmt::Continue(_)
            | ast::Stmt::Global(_)
            | ast::Stmt::Nonlocal(_) => self.infer_seq(rest, file, env, stack),
            other => {
                log::debug!("skipping unsupported statement at {:?}", NodeId::of(file, other));
                self.infer_seq(rest, file, env, stack)
            }
        }
    }

    /// Join two interpreted arms and continue with the rest of the block.
    ///
    /// An arm whose result carries no continuation cannot fall through. When
    /// neither arm can, the rest of the block is unreachable; when one can,
    /// interpretation continues in that arm's environment; when both can,
    /// it continues in the per-name merge of the two.
    fn join_branches(
        &mut self,
        (t1, env1): (ValueSet, Env),
        (t2, env2): (ValueSet, Env),
        rest: &[ast::Stmt],
        file: &Path,
        env_before: Env,
        stack: &CallStack,
    ) -> (ValueSet, Env) {
        let falls1 = t1.has_continuation();
        let falls2 = t2.has_continuation();
        match (falls1, falls2) {
            (false, false) => {
                self.flag_unreachable(rest, file);
                (union([t1, t2]), env_before)
            }
            (false, true) => {
                let (t3, env3) = self.infer_seq(rest, file, env2, stack);
                (union([t1, t2.without_continuation(), t3]), env3)
            }
            (true, false) => {
                let (t3, env3) = self.infer_seq(rest, file, env1, stack);
                (union([t1.without_continuation(), t2, t3]), env3)
            }
            (true, true) => {
                let merged = env1.merge(&env2);
                let (t3, env3) = self.infer_seq(rest, file, merged, stack);
                (
                    union([t1.without_continuation(), t2.without_continuation(), t3]),
                    env3,
                )
            }
        }
    }

    fn flag_unreachable(&mut self, stmts: &[ast::Stmt], file: &Path) {
        for stmt in stmts {
            let node = NodeId::of(file, stmt);
            log::debug!("unreachable statement at {node}");
            let diag = Diagnostic::new(DiagKind::UnreachableCode, "unreachable code", node.clone());
            self.session
                .history
                .record(node, ValueSet::unit(Value::Diag(diag)));
        }
    }

    // ==================== Definitions ====================

    /// Interpret a `def` statement: fill the placeholder closure's
    /// environment cell and memoize its default-parameter sets.
    fn define_function(
        &mut self,
        def: &ast::StmtFunctionDef,
        env: &Env,
        file: &Path,
        stack: &CallStack,
    ) {
        let Some(candidates) = env.lookup(def.name.as_str()).cloned() else {
            log::debug!("function {} not pre-bound in its own block", def.name);
            return;
        };
        let defaults: Vec<ValueSet> = def
            .args
            .defaults()
            .map(|d| self.infer_expr(d, file, env, stack))
            .collect();
        for value in candidates.iter() {
            if let Value::Closure(closure) = value {
                let _ = closure.env.set(env.clone());
                if closure.defaults.borrow().is_empty() && !defaults.is_empty() {
                    *closure.defaults.borrow_mut() = defaults.clone();
                }
            }
        }
    }

    /// Interpret a `class` statement: fill the class's environment cell,
    /// run the body, and fold assignment-produced attributes back into the
    /// class.
    fn define_class(
        &mut self,
        def: &ast::StmtClassDef,
        env: &Env,
        file: &Path,
        stack: &CallStack,
    ) {
        let candidates = match env.lookup(def.name.as_str()) {
            Some(set) => set.clone(),
            None => {
                log::debug!("class {} not pre-bound in its own block", def.name);
                ValueSet::new()
            }
        };
        for value in candidates.iter() {
            if let Value::Class(class) = value {
                let _ = class.env.set(env.clone());
            }
        }
        let (_result, exit_env) = self.infer_block(&def.body, file, env.clone(), stack);
        let assigned = assigned_names(&def.body);
        for value in candidates.iter() {
            if let Value::Class(class) = value {
                for name in &assigned {
                    if let Some(values) = exit_env.lookup(name) {
                        if !values.is_empty() {
                            class.attrs.borrow_mut().set(name.clone(), values.clone());
                        }
                    }
                }
            }
        }
    }

    // ==================== Binding ====================

    /// Bind an assignment target. Name targets extend the environment;
    /// attribute targets mutate the receiver; tuple and list targets
    /// distribute; anything else is a diagnostic.
    pub(crate) fn bind(
        &mut self,
        target: &ast::Expr,
        values: ValueSet,
        env: Env,
        file: &Path,
        stack: &CallStack,
    ) -> Env {
        match target {
            ast::Expr::Name(n) => {
                let node = NodeId::of(file, n);
                self.session
                    .history
                    .record_name(n.id.as_str(), node, values.clone());
                env.extend(n.id.to_string(), values)
            }
            ast::Expr::Attribute(a) => {
                let receivers = self.infer_expr(&a.value, file, &env, stack);
                for receiver in receivers.iter() {
                    match receiver {
                        Value::Class(c) => {
                            c.attrs.borrow_mut().set(a.attr.to_string(), values.clone());
                        }
                        Value::Instance(i) => {
                            i.attrs.borrow_mut().set(a.attr.to_string(), values.clone());
                        }
                        other => {
                            let node = NodeId::of(file, a);
                            let diag = Diagnostic::new(
                                DiagKind::BadAssignTarget,
                                format!("cannot set attribute {} on {other}", a.attr),
                                node.clone(),
                            );
                            self.session
                                .history
                                .record(node, ValueSet::unit(Value::Diag(diag)));
                        }
                    }
                }
                env
            }
            ast::Expr::Tuple(t) => self.bind_unpack(&t.elts, &values, env, file, stack, target),
            ast::Expr::List(l) => self.bind_unpack(&l.elts, &values, env, file, stack, target),
            other => {
                let node = NodeId::of(file, other);
                let diag = Diagnostic::new(
                    DiagKind::BadAssignTarget,
                    "target is not assignable",
                    node.clone(),
                );
                self.session
                    .history
                    .record(node, ValueSet::unit(Value::Diag(diag)));
                env
            }
        }
    }

    /// Distribute sequence members over a tuple or list target, collecting
    /// arity mismatches as diagnostics on the target.
    fn bind_unpack(
        &mut self,
        elts: &[ast::Expr],
        values: &ValueSet,
        env: Env,
        file: &Path,
        stack: &CallStack,
        target: &ast::Expr,
    ) -> Env {
        let node = NodeId::of(file, target);
        let mut per_target: Vec<ValueSet> = vec![ValueSet::new(); elts.len()];
        for value in values.iter() {
            match value {
                Value::Seq(seq) => {
                    if seq.elems.len() == elts.len() {
                        for (slot, elem) in per_target.iter_mut().zip(seq.elems.iter()) {
                            slot.extend(elem);
                        }
                    } else {
                        let detail = if seq.elems.len() > elts.len() {
                            "too many values to unpack"
                        } else {
                            "not enough values to unpack"
                        };
                        let diag =
                            Diagnostic::new(DiagKind::UnpackMismatch, detail, node.clone());
                        self.session
                            .history
                            .record(node.clone(), ValueSet::unit(Value::Diag(diag)));
                    }
                }
                other => {
                    let diag = Diagnostic::new(
                        DiagKind::NotIterable,
                        format!("cannot unpack {other}"),
                        node.clone(),
                    );
                    self.session
                        .history
                        .record(node.clone(), ValueSet::unit(Value::Diag(diag)));
                }
            }
        }
        let mut env = env;
        for (elt, collected) in elts.iter().zip(per_target) {
            if !collected.is_empty() {
                env = self.bind(elt, collected, env, file, stack);
            }
        }
        env
    }

    // ==================== Imports ====================

    fn handle_import(&mut self, s: &ast::StmtImport, env: Env, file: &Path) -> Env {
        let node = NodeId::of(file, s);
        let mut env = env;
        for alias in &s.names {
            let rec = self.resolve_module(alias.name.as_str());
            let class = module_pseudo_class(&rec, node.clone());
            let instance = InstanceValue::construct(&class, Vec::new(), node.clone());
            let bound = ValueSet::unit(Value::Instance(instance));
            let target = alias.asname.as_ref().unwrap_or(&alias.name);
            self.session
                .history
                .record_name(target.as_str(), node.clone(), bound.clone());
            env = env.extend(target.to_string(), bound);
        }
        env
    }

    fn handle_import_from(&mut self, s: &ast::StmtImportFrom, env: Env, file: &Path) -> Env {
        let node = NodeId::of(file, s);
        let rec = match &s.module {
            Some(module) => self.resolve_module(module.as_str()),
            None => {
                log::warn!("relative import without a module name, binding unknowns");
                Rc::new(ModuleRec::missing())
            }
        };
        let mut env = env;
        for alias in &s.names {
            let values = match rec.env.lookup(alias.name.as_str()) {
                Some(set) if !set.is_empty() => set.clone(),
                _ => ValueSet::unit(self.unknown(node.clone())),
            };
            let target = alias.asname.as_ref().unwrap_or(&alias.name);
            self.session
                .history
                .record_name(target.as_str(), node.clone(), values.clone());
            env = env.extend(target.to_string(), values);
        }
        env
    }

    /// Locate, parse and interpret a module, memoizing the result. Missing
    /// or cyclic modules yield an empty record.
    pub(crate) fn resolve_module(&mut self, name: &str) -> Rc<ModuleRec> {
        if let Some(rec) = self.session.modules.get(name) {
            return rec;
        }
        if !self.session.modules.begin(name) {
            log::warn!("circular import of {name}, treating as empty");
            return Rc::new(ModuleRec::missing());
        }
        let rec = match modules::locate(name, &self.session.config) {
            Some((path, source)) => match crate::syntax::parse_module(&source, &path) {
                Ok(body) => {
                    self.session.sources.insert(path.clone(), source);
                    self.session.stats.modules_loaded += 1;
                    let body = Rc::new(body);
                    let (_result, exit_env) = self.infer_module(&body, &path);
                    ModuleRec {
                        body,
                        env: exit_env,
                        file: path,
                    }
                }
                Err(e) => {
                    log::warn!("failed to parse module {name}: {e}");
                    ModuleRec::missing()
                }
            },
            None => {
                log::warn!("module {name} not found on the search path");
                ModuleRec::missing()
            }
        };
        self.session.modules.finish(name, Rc::new(rec))
    }
}

/// The pseudo-class backing an imported module: the module's visible
/// bindings become attributes, and method bodies run in the module's exit
/// environment without a receiver.
fn module_pseudo_class(rec: &ModuleRec, node: NodeId) -> ClassValue {
    let mut attrs = AttrMap::new();
    for (name, values) in rec.env.visible() {
        if !values.is_empty() {
            attrs.set(name, values);
        }
    }
    let class = ClassValue::new("module".to_string(), ClassKind::Module, attrs, node);
    let _ = class.env.set(rec.env.clone());
    class
}

/// Names assigned by plain or annotated assignments directly in a block,
/// first occurrence first. Tuple and list targets contribute their name
/// elements.
fn assigned_names(stmts: &[ast::Stmt]) -> Vec<String> {
    fn collect(target: &ast::Expr, out: &mut Vec<String>) {
        match target {
            ast::Expr::Name(n) => {
                let name = n.id.to_string();
                if !out.contains(&name) {
                    out.push(name);
                }
            }
            ast::Expr::Tuple(t) => {
                for elt in &t.elts {
                    collect(elt, out);
                }
            }
            ast::Expr::List(l) => {
                for elt in &l.elts {
                    collect(elt, out);
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            ast::Stmt::Assign(s) => {
                for target in &s.targets {
                    collect(target, &mut out);
                }
            }
            ast::Stmt::AnnAssign(s) => collect(&s.target, &mut out),
            _ => {}
        }
    }
    out
}

/// Pool an iterable's contents into one flat set: sequences contribute their
/// element sets, dictionaries their keys, anything else passes through.
fn flatten_iterable(set: &ValueSet) -> ValueSet {
    let mut out = ValueSet::new();
    for value in set.iter() {
        match value {
            Value::Seq(seq) => {
                for elem in seq.elems.iter() {
                    out.extend(elem);
                }
            }
            Value::Dict(dict) => {
                for entry in dict.entries.iter() {
                    out.push(entry.key.clone());
                }
            }
            other => out.push(other.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::values::SeqValue;
    use pretty_assertions::assert_eq;

    fn session() -> AnalysisSession {
        AnalysisSession::new(AnalysisConfig::new())
    }

    fn parse(source: &str) -> Vec<ast::Stmt> {
        crate::syntax::parse_module(source, Path::new("<test>")).unwrap()
    }

    #[test]
    fn close_pre_binds_defs_classes_and_assign_targets() {
        let body = parse("x = 1\n\ndef f():\n    pass\n\nclass C:\n    pass\n");
        let mut session = session();
        let mut interp = Interp::new(&mut session);
        let env = interp.close_block(&body, Env::new(), Path::new("<test>"));
        assert_eq!(env.lookup("x"), Some(&ValueSet::new()));
        assert!(matches!(
            env.lookup("f").and_then(ValueSet::only),
            Some(Value::Closure(_))
        ));
        assert!(matches!(
            env.lookup("C").and_then(ValueSet::only),
            Some(Value::Class(_))
        ));
    }

    #[test]
    fn class_built_at_close_has_its_method_names() {
        let body = parse("class C:\n    def m(self):\n        pass\n");
        let mut session = session();
        let mut interp = Interp::new(&mut session);
        let env = interp.close_block(&body, Env::new(), Path::new("<test>"));
        match env.lookup("C").and_then(ValueSet::only) {
            Some(Value::Class(c)) => {
                assert!(c.attrs.borrow().contains("m"));
                assert_eq!(c.attrs.borrow().len(), 1);
            }
            other => panic!("expected a class, got {other:?}"),
        }
    }

    #[test]
    fn assigned_names_sees_tuple_targets_once() {
        let body = parse("a, b = 1, 2\na = 3\n");
        assert_eq!(assigned_names(&body), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn flatten_iterable_pools_sequences_and_dict_keys() {
        let int = |i: i64| Value::Prim(Literal::Int(i));
        let seq = Value::Seq(SeqValue::new(vec![
            ValueSet::unit(int(1)),
            ValueSet::unit(int(2)),
        ]));
        let set: ValueSet = [seq, int(9)].into_iter().collect();
        let flat = flatten_iterable(&set);
        assert!(flat.contains(&int(1)));
        assert!(flat.contains(&int(2)));
        assert!(flat.contains(&int(9)));
        assert_eq!(flat.len(), 3);
    }
}
