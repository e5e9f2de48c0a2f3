//! Call handling: constructors, bound methods, closures, and the argument
//! binder.
//!
//! A call evaluates its callee and arguments once, then dispatches every
//! callee candidate against the shared argument sets and unions the results.
//! Recursion is cut by the call-stack guard: a call already in flight with
//! bindings covering the current ones yields the bottom sentinel instead of
//! descending again.

use std::path::Path;

use rustpython_parser::ast;

use crate::env::Env;
use crate::history::MethodInvocation;
use crate::session::CallStack;
use crate::syntax::NodeId;
use crate::values::{
    resolve_attributes, union, BoundMethodValue, ClassKind, ClassValue, ClosureValue, DiagKind,
    Diagnostic, DictEntry, DictValue, FuncKind, FuncType, InstanceValue, Literal, SeqValue, Value,
    ValueSet,
};

use super::Interp;

/// Arguments of one call site, evaluated exactly once and shared across
/// every callee candidate.
pub(crate) struct EvaluatedArgs {
    pub pos: Vec<ValueSet>,
    pub kw: Vec<(Option<String>, ValueSet)>,
}

impl Interp<'_> {
    pub(crate) fn invoke(
        &mut self,
        call: &ast::ExprCall,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let callees = self.infer_expr(&call.func, file, env, stack);
        let args = self.eval_args(call, file, env, stack);
        self.session.stats.calls_analyzed += 1;
        let node = NodeId::of(file, call);
        let mut out = ValueSet::new();
        for candidate in callees.iter() {
            let result = self.invoke_one(&node, candidate, &args, env, stack);
            out.extend(&result);
        }
        out
    }

    fn eval_args(
        &mut self,
        call: &ast::ExprCall,
        file: &Path,
        env: &Env,
        stack: &CallStack,
    ) -> EvaluatedArgs {
        let pos = call
            .args
            .iter()
            .map(|a| self.infer_expr(a, file, env, stack))
            .collect();
        let kw = call
            .keywords
            .iter()
            .map(|k| {
                (
                    k.arg.as_ref().map(|name| name.to_string()),
                    self.infer_expr(&k.value, file, env, stack),
                )
            })
            .collect();
        EvaluatedArgs { pos, kw }
    }

    fn invoke_one(
        &mut self,
        node: &NodeId,
        candidate: &Value,
        args: &EvaluatedArgs,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        match candidate {
            Value::Bottom => ValueSet::unit(Value::Bottom),
            Value::Class(class) => self.construct(node, class, args, env, stack),
            Value::BoundMethod(bm) => self.invoke_bound(node, bm, args, env, stack),
            Value::Closure(closure) => self.invoke_closure(node, closure, None, args, stack),
            Value::Builtin(_) => ValueSet::unit(self.unknown(node.clone())),
            other => {
                let diag = Diagnostic::new(
                    DiagKind::NotCallable,
                    format!("{other} is not callable"),
                    node.clone(),
                );
                self.session
                    .history
                    .record(node.clone(), ValueSet::unit(Value::Diag(diag.clone())));
                ValueSet::unit(Value::Diag(diag))
            }
        }
    }

    /// Calling a class: seed an instance from the class attributes, then run
    /// `__init__` for its side effects on the new instance.
    fn construct(
        &mut self,
        node: &NodeId,
        class: &ClassValue,
        args: &EvaluatedArgs,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        let instance = InstanceValue::construct(class, args.pos.clone(), node.clone());
        if let Some(init) = instance.attr("__init__") {
            for candidate in init.iter() {
                if let Value::BoundMethod(bm) = candidate {
                    let _ = self.invoke_bound(node, bm, args, env, stack);
                }
            }
        }
        ValueSet::unit(Value::Instance(instance))
    }

    /// Calling a bound method. Instance receivers get the receiver inserted
    /// as the leading argument and the method body pointed at the class's
    /// environment; module pseudo-instances skip the receiver; dictionary
    /// receivers dispatch to the synthesized natives.
    fn invoke_bound(
        &mut self,
        node: &NodeId,
        bm: &BoundMethodValue,
        args: &EvaluatedArgs,
        env: &Env,
        stack: &CallStack,
    ) -> ValueSet {
        match bm.receiver.as_ref() {
            Value::Instance(obj) => {
                self.record_invocation(bm, obj, args, env);
                let receiver = if obj.class.kind == ClassKind::Module {
                    None
                } else {
                    Some(ValueSet::unit(Value::Instance(obj.clone())))
                };
                let class_env = obj.class.env.get().cloned().unwrap_or_default();
                let mut out = ValueSet::new();
                for target in bm.targets.iter() {
                    match target {
                        Value::Closure(closure) => {
                            // method bodies resolve names through the class's
                            // defining scope, not the closure's own capture
                            let rebound = closure.with_env(class_env.clone());
                            out.extend(&self.invoke_closure(
                                node,
                                &rebound,
                                receiver.clone(),
                                args,
                                stack,
                            ));
                        }
                        Value::Class(class) => {
                            out.extend(&self.construct(node, class, args, env, stack));
                        }
                        other => {
                            let diag = Diagnostic::new(
                                DiagKind::UnsupportedCallable,
                                format!("cannot invoke {other} as a method"),
                                node.clone(),
                            );
                            self.session
                                .history
                                .record(node.clone(), ValueSet::unit(Value::Diag(diag.clone())));
                            out.push(Value::Diag(diag));
                        }
                    }
                }
                out
            }
            Value::Dict(dict) => {
                let mut out = ValueSet::new();
                for target in bm.targets.iter() {
                    match target {
                        Value::Builtin(tag) => out.extend(&dict_native(tag, dict, args)),
                        other => {
                            let diag = Diagnostic::new(
                                DiagKind::UnsupportedCallable,
                                format!("cannot invoke {other} on a dict"),
                                node.clone(),
                            );
                            self.session
                                .history
                                .record(node.clone(), ValueSet::unit(Value::Diag(diag.clone())));
                            out.push(Value::Diag(diag));
                        }
                    }
                }
                out
            }
            other => {
                let diag = Diagnostic::new(
                    DiagKind::UnsupportedCallable,
                    format!("method receiver {other} is not supported"),
                    node.clone(),
                );
                self.session
                    .history
                    .record(node.clone(), ValueSet::unit(Value::Diag(diag.clone())));
                ValueSet::unit(Value::Diag(diag))
            }
        }
    }

    /// Record telemetry for a method call carrying positional arguments:
    /// constructor arguments, the call's own arguments with bound-method
    /// wrappers flattened, the caller environment, and the method names.
    fn record_invocation(
        &mut self,
        bm: &BoundMethodValue,
        obj: &InstanceValue,
        args: &EvaluatedArgs,
        env: &Env,
    ) {
        if args.pos.is_empty() {
            return;
        }
        let invocation = MethodInvocation {
            ctor_args: obj.ctor_args.as_ref().clone(),
            call_args: args.pos.iter().map(resolve_attributes).collect(),
            env: env.clone(),
            methods: bm.target_names(),
        };
        self.session.telemetry.record(&obj.class.name, invocation);
    }

    /// Calling a closure: bind arguments to parameters, consult the
    /// recursion guard, then interpret the body in the captured environment
    /// extended with the bindings.
    fn invoke_closure(
        &mut self,
        node: &NodeId,
        closure: &ClosureValue,
        receiver: Option<ValueSet>,
        args: &EvaluatedArgs,
        stack: &CallStack,
    ) -> ValueSet {
        if self.session.config.should_skip(&closure.def.file) {
            let diag = Diagnostic::new(
                DiagKind::SkippedFile,
                format!(
                    "{} is defined in skipped file {}",
                    closure.def.name(),
                    closure.def.file.display()
                ),
                node.clone(),
            );
            return ValueSet::unit(Value::Diag(diag));
        }
        let bound = match self.bind_arguments(node, closure, receiver, args) {
            Ok(bound) => bound,
            Err(aborted) => return aborted,
        };
        if stack.seen(node, &bound) {
            return ValueSet::unit(Value::Bottom);
        }
        let inner_stack = stack.push(node.clone(), bound.clone());
        let mut body_env = closure.captured_env();
        for (name, values) in &bound {
            body_env = body_env.extend(name.clone(), values.clone());
        }
        let result = match &closure.def.kind {
            FuncKind::Def(def) => {
                self.infer_block(&def.body, &closure.def.file, body_env, &inner_stack)
                    .0
            }
            FuncKind::Lambda(lambda) => {
                self.infer_expr(&lambda.body, &closure.def.file, &body_env, &inner_stack)
            }
        };
        self.session.history.record(
            closure.def.id(),
            ValueSet::unit(Value::FuncType(Box::new(FuncType {
                params: bound,
                result: result.clone(),
            }))),
        );
        result
    }

    /// Bind actual arguments to formal parameters, in binding order:
    /// positionals, then the vararg pool, then keywords, then the keyword
    /// dictionary, then right-aligned defaults. Only an excess of
    /// positionals aborts the call; every other mismatch records a
    /// diagnostic and carries on.
    fn bind_arguments(
        &mut self,
        node: &NodeId,
        closure: &ClosureValue,
        receiver: Option<ValueSet>,
        args: &EvaluatedArgs,
    ) -> Result<Vec<(String, ValueSet)>, ValueSet> {
        let fargs = closure.def.args();
        let positional: Vec<String> = fargs
            .posonlyargs
            .iter()
            .chain(fargs.args.iter())
            .map(|a| a.def.arg.to_string())
            .collect();
        let keyword_only: Vec<String> = fargs
            .kwonlyargs
            .iter()
            .map(|a| a.def.arg.to_string())
            .collect();

        let mut actuals: Vec<ValueSet> = Vec::new();
        if let Some(receiver_set) = receiver {
            if positional.is_empty() {
                log::warn!(
                    "method {} has no parameter to receive its instance",
                    closure.def.name()
                );
            } else {
                actuals.push(receiver_set);
            }
        }
        actuals.extend(args.pos.iter().cloned());

        let mut bound: Vec<(String, ValueSet)> = Vec::new();
        for (name, values) in positional.iter().zip(actuals.iter()) {
            bound.push((name.clone(), values.clone()));
        }
        if actuals.len() > positional.len() {
            match &fargs.vararg {
                Some(vararg) => {
                    let extra = union(actuals[positional.len()..].iter().cloned());
                    bound.push((vararg.arg.to_string(), extra));
                }
                None => {
                    let diag = Diagnostic::new(
                        DiagKind::ExcessArguments,
                        format!(
                            "{} takes {} positional arguments but {} were given",
                            closure.def.name(),
                            positional.len(),
                            actuals.len()
                        ),
                        node.clone(),
                    );
                    self.session
                        .history
                        .record(node.clone(), ValueSet::unit(Value::Diag(diag.clone())));
                    return Err(ValueSet::unit(Value::Diag(diag)));
                }
            }
        }

        let mut sink: Vec<(String, ValueSet)> = Vec::new();
        for (name, values) in &args.kw {
            let Some(name) = name else {
                log::debug!("ignoring a **kwargs spread at the call site");
                continue;
            };
            if bound.iter().any(|(b, _)| b == name) {
                let diag = Diagnostic::new(
                    DiagKind::MultipleValues,
                    format!("multiple values for parameter {name}"),
                    node.clone(),
                );
                self.session
                    .history
                    .record(node.clone(), ValueSet::unit(Value::Diag(diag)));
            } else if positional.contains(name) || keyword_only.contains(name) {
                bound.push((name.clone(), values.clone()));
            } else {
                sink.push((name.clone(), values.clone()));
            }
        }
        match &fargs.kwarg {
            Some(kwarg) => {
                let entries = sink
                    .into_iter()
                    .map(|(key, values)| DictEntry {
                        key: Value::Prim(Literal::Str(key)),
                        values,
                    })
                    .collect();
                bound.push((
                    kwarg.arg.to_string(),
                    ValueSet::unit(Value::Dict(DictValue::new(entries))),
                ));
            }
            None => {
                for (key, _) in &sink {
                    let diag = Diagnostic::new(
                        DiagKind::UnexpectedKeyword,
                        format!("unexpected keyword argument {key}"),
                        node.clone(),
                    );
                    self.session
                        .history
                        .record(node.clone(), ValueSet::unit(Value::Diag(diag)));
                }
            }
        }

        let defaults = closure.defaults.borrow().clone();
        if !defaults.is_empty() && defaults.len() <= positional.len() {
            let start = positional.len() - defaults.len();
            for (offset, default) in defaults.iter().enumerate() {
                let name = &positional[start + offset];
                if !bound.iter().any(|(b, _)| b == name) {
                    bound.push((name.clone(), default.clone()));
                }
            }
        }
        Ok(bound)
    }
}

/// The synthesized dictionary methods. Keys and items reflect the entry
/// list; values and get pool every entry's values, since an abstract key
/// rarely pins down one entry.
fn dict_native(tag: &str, dict: &DictValue, args: &EvaluatedArgs) -> ValueSet {
    match tag {
        "keys" => dict.entries.iter().map(|e| e.key.clone()).collect(),
        "values" => dict.pooled_values(),
        "items" => dict
            .entries
            .iter()
            .map(|e| {
                Value::Seq(SeqValue::new(vec![
                    ValueSet::unit(e.key.clone()),
                    e.values.clone(),
                ]))
            })
            .collect(),
        "get" => {
            let mut out = dict.pooled_values();
            if let Some(default) = args.pos.get(1) {
                out.extend(default);
            }
            out
        }
        _ => ValueSet::new(),
    }
}
