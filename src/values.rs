//! Abstract values and value-sets.
//!
//! Every expression evaluates to a [`ValueSet`]: a small, order-preserving,
//! duplicate-free collection of [`Value`]s covering the possibilities the
//! analysis could prove. Dispatch over values is a closed `match` everywhere;
//! adding a variant is meant to break every site that has not considered it.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustpython_parser::ast;

use crate::env::Env;
use crate::syntax::NodeId;

// ==================== Literals ====================

/// Scalar constants carried through the analysis verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

impl Literal {
    /// Convert a parsed constant into a literal, when it fits.
    ///
    /// Integers wider than 64 bits, complex numbers and folded constant
    /// tuples have no literal form and degrade to unknowns at the call site.
    pub fn from_constant(constant: &ast::Constant) -> Option<Literal> {
        match constant {
            ast::Constant::None => Some(Literal::None),
            ast::Constant::Bool(b) => Some(Literal::Bool(*b)),
            ast::Constant::Str(s) => Some(Literal::Str(s.clone())),
            ast::Constant::Bytes(b) => Some(Literal::Bytes(b.clone())),
            ast::Constant::Int(i) => i.to_string().parse::<i64>().ok().map(Literal::Int),
            ast::Constant::Float(f) => Some(Literal::Float(*f)),
            ast::Constant::Ellipsis => Some(Literal::Ellipsis),
            ast::Constant::Complex { .. } | ast::Constant::Tuple(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s) => write!(f, "'{s}'"),
            Literal::Bytes(b) => write!(f, "b<{} bytes>", b.len()),
            Literal::Ellipsis => write!(f, "..."),
        }
    }
}

// ==================== Attribute maps ====================

/// Ordered name-to-value-set map used for class and instance attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttrMap {
    entries: Vec<(String, ValueSet)>,
}

impl AttrMap {
    pub fn new() -> AttrMap {
        AttrMap::default()
    }

    pub fn get(&self, name: &str) -> Option<&ValueSet> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Insert or replace an attribute. Writes are destructive, matching
    /// Python's attribute assignment.
    pub fn set(&mut self, name: String, values: ValueSet) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = values,
            None => self.entries.push((name, values)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ValueSet)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==================== Function definitions ====================

/// The syntactic side of a closure: a `def` statement or a `lambda`.
#[derive(Clone, Debug)]
pub enum FuncKind {
    Def(ast::StmtFunctionDef),
    Lambda(ast::ExprLambda),
}

#[derive(Clone, Debug)]
pub struct FuncDef {
    pub file: PathBuf,
    pub kind: FuncKind,
}

impl FuncDef {
    pub fn function(def: &ast::StmtFunctionDef, file: &Path) -> FuncDef {
        FuncDef {
            file: file.to_path_buf(),
            kind: FuncKind::Def(def.clone()),
        }
    }

    pub fn lambda(def: &ast::ExprLambda, file: &Path) -> FuncDef {
        FuncDef {
            file: file.to_path_buf(),
            kind: FuncKind::Lambda(def.clone()),
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            FuncKind::Def(def) => def.name.as_str(),
            FuncKind::Lambda(_) => "<lambda>",
        }
    }

    pub fn args(&self) -> &ast::Arguments {
        match &self.kind {
            FuncKind::Def(def) => &def.args,
            FuncKind::Lambda(lam) => &lam.args,
        }
    }

    pub fn id(&self) -> NodeId {
        match &self.kind {
            FuncKind::Def(def) => NodeId::of(&self.file, def),
            FuncKind::Lambda(lam) => NodeId::of(&self.file, lam),
        }
    }
}

// ==================== Composite values ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    /// An ordinary `class` statement.
    User,
    /// The pseudo-class synthesized for an imported module. Its methods are
    /// invoked without a receiver argument.
    Module,
}

/// A class: named attribute table plus the environment it was defined in.
///
/// The defining environment lives in a write-once cell because the class
/// value is created while that environment is still being built; the cell is
/// filled when interpretation reaches the `class` statement.
#[derive(Clone)]
pub struct ClassValue {
    pub name: String,
    pub kind: ClassKind,
    pub node: NodeId,
    pub attrs: Rc<RefCell<AttrMap>>,
    pub env: Rc<OnceCell<Env>>,
}

impl ClassValue {
    pub fn new(name: String, kind: ClassKind, attrs: AttrMap, node: NodeId) -> ClassValue {
        ClassValue {
            name,
            kind,
            node,
            attrs: Rc::new(RefCell::new(attrs)),
            env: Rc::new(OnceCell::new()),
        }
    }

    pub fn attr(&self, name: &str) -> Option<ValueSet> {
        self.attrs.borrow().get(name).cloned()
    }
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassValue")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("node", &self.node)
            .finish()
    }
}

/// An instance produced by calling a class.
///
/// Seeding copies the class attributes: closures become bound methods whose
/// receiver is the new instance, everything else is copied as-is. The
/// attribute map is shared mutable state so later attribute writes are
/// visible through every alias of the instance.
#[derive(Clone)]
pub struct InstanceValue {
    pub class: ClassValue,
    pub ctor_args: Rc<Vec<ValueSet>>,
    pub attrs: Rc<RefCell<AttrMap>>,
    pub node: NodeId,
}

impl InstanceValue {
    pub fn construct(class: &ClassValue, ctor_args: Vec<ValueSet>, node: NodeId) -> InstanceValue {
        let instance = InstanceValue {
            class: class.clone(),
            ctor_args: Rc::new(ctor_args),
            attrs: Rc::new(RefCell::new(AttrMap::new())),
            node,
        };
        let class_attrs = class.attrs.borrow().clone();
        for (name, set) in class_attrs.iter() {
            let mut closures = Vec::new();
            let mut seeded = ValueSet::new();
            for value in set.iter() {
                match value {
                    Value::Closure(_) => closures.push(value.clone()),
                    other => seeded.push(other.clone()),
                }
            }
            if !closures.is_empty() {
                seeded.push(Value::BoundMethod(BoundMethodValue {
                    targets: Rc::new(closures),
                    receiver: Rc::new(Value::Instance(instance.clone())),
                }));
            }
            instance.attrs.borrow_mut().set(name.clone(), seeded);
        }
        instance
    }

    pub fn attr(&self, name: &str) -> Option<ValueSet> {
        self.attrs.borrow().get(name).cloned()
    }
}

impl fmt::Debug for InstanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceValue")
            .field("class", &self.class.name)
            .field("node", &self.node)
            .finish()
    }
}

/// A function value: definition plus captured environment plus memoized
/// default-parameter sets. The environment cell is written when the `def`
/// statement is interpreted, which lets the closure refer to itself and to
/// later definitions in the same block.
#[derive(Clone)]
pub struct ClosureValue {
    pub def: Rc<FuncDef>,
    pub env: Rc<OnceCell<Env>>,
    pub defaults: Rc<RefCell<Vec<ValueSet>>>,
}

impl ClosureValue {
    pub fn new(def: FuncDef) -> ClosureValue {
        ClosureValue {
            def: Rc::new(def),
            env: Rc::new(OnceCell::new()),
            defaults: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A copy of this closure that runs in `env` instead of its captured
    /// environment. Used to point method bodies at their class's scope.
    pub fn with_env(&self, env: Env) -> ClosureValue {
        ClosureValue {
            def: Rc::clone(&self.def),
            env: Rc::new(OnceCell::from(env)),
            defaults: Rc::clone(&self.defaults),
        }
    }

    pub fn captured_env(&self) -> Env {
        self.env.get().cloned().unwrap_or_default()
    }
}

impl fmt::Debug for ClosureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureValue")
            .field("name", &self.def.name())
            .field("node", &self.def.id())
            .finish()
    }
}

/// Callable attribute bound to a receiver.
///
/// Targets are the candidate callables behind the attribute name. The
/// receiver is an instance, a module pseudo-instance, or a dictionary (whose
/// methods are the synthesized native ones).
#[derive(Clone)]
pub struct BoundMethodValue {
    pub targets: Rc<Vec<Value>>,
    pub receiver: Rc<Value>,
}

impl BoundMethodValue {
    pub fn new(targets: Vec<Value>, receiver: Value) -> BoundMethodValue {
        BoundMethodValue {
            targets: Rc::new(targets),
            receiver: Rc::new(receiver),
        }
    }

    pub fn target_names(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|t| match t {
                Value::Closure(c) => c.def.name().to_string(),
                Value::Class(c) => c.name.clone(),
                Value::Builtin(name) => (*name).to_string(),
                _ => "?".to_string(),
            })
            .collect()
    }

    fn receiver_label(&self) -> String {
        match self.receiver.as_ref() {
            Value::Instance(obj) => obj.class.name.clone(),
            Value::Dict(_) => "dict".to_string(),
            _ => "?".to_string(),
        }
    }
}

impl fmt::Debug for BoundMethodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethodValue")
            .field("targets", &self.target_names())
            .field("receiver", &self.receiver_label())
            .finish()
    }
}

/// Tuple or list: one value-set per element position. The analysis does not
/// distinguish the two container kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct SeqValue {
    pub elems: Rc<Vec<ValueSet>>,
}

impl SeqValue {
    pub fn new(elems: Vec<ValueSet>) -> SeqValue {
        SeqValue {
            elems: Rc::new(elems),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DictEntry {
    pub key: Value,
    pub values: ValueSet,
}

/// Dictionary: an association list from abstract keys to value-sets.
#[derive(Clone, Debug, PartialEq)]
pub struct DictValue {
    pub entries: Rc<Vec<DictEntry>>,
}

impl DictValue {
    pub fn new(entries: Vec<DictEntry>) -> DictValue {
        DictValue {
            entries: Rc::new(entries),
        }
    }

    pub fn empty() -> DictValue {
        DictValue::new(Vec::new())
    }

    /// Union of every entry's values; key information is deliberately
    /// ignored because abstract keys rarely resolve to a single entry.
    pub fn pooled_values(&self) -> ValueSet {
        union(self.entries.iter().map(|e| e.values.clone()))
    }
}

/// Record of one analyzed call: parameter bindings and result. Stored in the
/// history under the callee's definition node.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncType {
    pub params: Vec<(String, ValueSet)>,
    pub result: ValueSet,
}

// ==================== Diagnostics ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagKind {
    UnknownAttribute,
    NotCallable,
    ExcessArguments,
    MultipleValues,
    UnexpectedKeyword,
    BadAssignTarget,
    UnpackMismatch,
    NotIterable,
    UnreachableCode,
    SkippedFile,
    UnsupportedCallable,
}

impl DiagKind {
    /// Stable machine-readable tag, used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            DiagKind::UnknownAttribute => "unknown-attribute",
            DiagKind::NotCallable => "not-callable",
            DiagKind::ExcessArguments => "excess-arguments",
            DiagKind::MultipleValues => "multiple-values",
            DiagKind::UnexpectedKeyword => "unexpected-keyword",
            DiagKind::BadAssignTarget => "bad-assign-target",
            DiagKind::UnpackMismatch => "unpack-mismatch",
            DiagKind::NotIterable => "not-iterable",
            DiagKind::UnreachableCode => "unreachable-code",
            DiagKind::SkippedFile => "skipped-file",
            DiagKind::UnsupportedCallable => "unsupported-callable",
        }
    }
}

impl fmt::Display for DiagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A semantic oddity observed while analyzing. Diagnostics are ordinary
/// values: they flow through unions, land in the history, and never abort
/// the analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagKind,
    pub detail: String,
    pub node: NodeId,
}

impl Diagnostic {
    pub fn new(kind: DiagKind, detail: impl Into<String>, node: NodeId) -> Diagnostic {
        Diagnostic {
            kind,
            detail: detail.into(),
            node,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {}>", self.kind, self.detail)
    }
}

// ==================== The value union ====================

/// One abstract value. The variants form a closed union; every consumer
/// matches exhaustively.
#[derive(Clone, Debug)]
pub enum Value {
    /// Nothing could be proved about the expression at this node.
    Unknown(NodeId),
    Prim(Literal),
    /// A recognized builtin name. Opaque: calling one yields an unknown.
    Builtin(&'static str),
    Class(ClassValue),
    Instance(InstanceValue),
    Closure(ClosureValue),
    BoundMethod(BoundMethodValue),
    Seq(SeqValue),
    Dict(DictValue),
    FuncType(Box<FuncType>),
    Diag(Diagnostic),
    /// Sentinel: control flow falls through the end of a block.
    Continuation,
    /// Sentinel: a call cut off by the recursion guard.
    Bottom,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unknown(a), Value::Unknown(b)) => a == b,
            (Value::Prim(a), Value::Prim(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a.node == b.node,
            (Value::Instance(a), Value::Instance(b)) => a.node == b.node,
            (Value::Closure(a), Value::Closure(b)) => {
                Rc::ptr_eq(&a.def, &b.def) && Rc::ptr_eq(&a.env, &b.env)
            }
            (Value::BoundMethod(a), Value::BoundMethod(b)) => {
                a.targets == b.targets && a.receiver == b.receiver
            }
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::FuncType(a), Value::FuncType(b)) => a == b,
            (Value::Diag(a), Value::Diag(b)) => a == b,
            (Value::Continuation, Value::Continuation) => true,
            (Value::Bottom, Value::Bottom) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unknown(_) => write!(f, "?"),
            Value::Prim(lit) => write!(f, "{lit}"),
            Value::Builtin(name) => write!(f, "<builtin {name}>"),
            Value::Class(c) => write!(f, "<class {}>", c.name),
            Value::Instance(i) => write!(f, "<instance of {}>", i.class.name),
            Value::Closure(c) => write!(f, "<function {}>", c.def.name()),
            Value::BoundMethod(m) => {
                write!(
                    f,
                    "<method {} of {}>",
                    m.target_names().join("|"),
                    m.receiver_label()
                )
            }
            Value::Seq(seq) => {
                write!(f, "[")?;
                for (i, elem) in seq.elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
            Value::Dict(d) => {
                write!(f, "{{")?;
                for (i, entry) in d.entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", entry.key, entry.values)?;
                }
                write!(f, "}}")
            }
            Value::FuncType(ft) => {
                write!(f, "(")?;
                for (i, (name, values)) in ft.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {values}")?;
                }
                write!(f, ") -> {}", ft.result)
            }
            Value::Diag(d) => write!(f, "{d}"),
            Value::Continuation => write!(f, "<cont>"),
            Value::Bottom => write!(f, "<bottom>"),
        }
    }
}

// ==================== Value sets ====================

/// An order-preserving, duplicate-free set of values.
#[derive(Clone, Debug, Default)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> ValueSet {
        ValueSet::default()
    }

    pub fn unit(value: Value) -> ValueSet {
        ValueSet { items: vec![value] }
    }

    /// Insert, skipping values already present.
    pub fn push(&mut self, value: Value) {
        if !self.items.contains(&value) {
            self.items.push(value);
        }
    }

    pub fn extend(&mut self, other: &ValueSet) {
        for value in &other.items {
            self.push(value.clone());
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The single member, when the set has exactly one.
    pub fn only(&self) -> Option<&Value> {
        match self.items.as_slice() {
            [v] => Some(v),
            _ => None,
        }
    }

    /// Whether control can fall through: the continuation sentinel is present.
    pub fn has_continuation(&self) -> bool {
        self.items
            .iter()
            .any(|v| matches!(v, Value::Continuation))
    }

    /// Copy of the set with continuation sentinels removed.
    pub fn without_continuation(&self) -> ValueSet {
        ValueSet {
            items: self
                .items
                .iter()
                .filter(|v| !matches!(v, Value::Continuation))
                .cloned()
                .collect(),
        }
    }

    pub fn is_subset_of(&self, other: &ValueSet) -> bool {
        self.items.iter().all(|v| other.contains(v))
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.is_subset_of(other) && other.is_subset_of(self)
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> ValueSet {
        let mut set = ValueSet::new();
        for value in iter {
            set.push(value);
        }
        set
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "<empty>");
        }
        for (i, value) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Union of several value-sets.
///
/// Deduplicates, and pools every sequence member into a single sequence
/// whose element list is the union of the inputs' element-sets. Pooling is
/// what keeps loops over growing lists finite.
pub fn union<I>(parts: I) -> ValueSet
where
    I: IntoIterator<Item = ValueSet>,
{
    let mut merged = ValueSet::new();
    let mut pooled: Vec<ValueSet> = Vec::new();
    let mut saw_seq = false;
    for part in parts {
        for value in part.items {
            match value {
                Value::Seq(seq) => {
                    saw_seq = true;
                    for elem in seq.elems.iter() {
                        if !pooled.iter().any(|p| p == elem) {
                            pooled.push(elem.clone());
                        }
                    }
                }
                other => merged.push(other),
            }
        }
    }
    if saw_seq {
        merged.push(Value::Seq(SeqValue::new(pooled)));
    }
    merged
}

/// Whether every binding in `current` is covered by one in `previous`:
/// same name, and the current values are a subset of the previous ones.
/// This is the structural check behind the recursion guard.
pub fn subtype_bindings(
    current: &[(String, ValueSet)],
    previous: &[(String, ValueSet)],
) -> bool {
    current.iter().all(|(name, values)| {
        previous
            .iter()
            .any(|(pname, pvalues)| pname == name && values.is_subset_of(pvalues))
    })
}

/// Flatten bound methods down to their underlying callables. Used when
/// recording call telemetry, where the binding wrapper is noise.
pub fn resolve_attributes(set: &ValueSet) -> ValueSet {
    fn flatten(value: &Value, out: &mut ValueSet) {
        match value {
            Value::BoundMethod(bm) => {
                for target in bm.targets.iter() {
                    flatten(target, out);
                }
            }
            other => out.push(other.clone()),
        }
    }
    let mut out = ValueSet::new();
    for value in set.iter() {
        flatten(value, &mut out);
    }
    out
}
