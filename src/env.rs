//! Persistent lexical environments.
//!
//! An environment is an immutable stack of name bindings: extension prepends
//! and shadows, lookup finds the newest binding. Structural sharing through
//! `im` keeps the frequent clone-and-extend cycle cheap, and a name index
//! keeps lookup constant-time regardless of binding depth.

use im::{HashMap, Vector};

use crate::values::{union, ValueSet};

#[derive(Clone, Debug)]
pub struct Binding {
    pub name: String,
    pub values: ValueSet,
}

#[derive(Clone, Debug, Default)]
pub struct Env {
    bindings: Vector<Binding>,
    index: HashMap<String, ValueSet>,
}

impl Env {
    pub fn new() -> Env {
        Env::default()
    }

    /// Bind `name`, shadowing any previous binding of the same name.
    pub fn extend(&self, name: impl Into<String>, values: ValueSet) -> Env {
        let name = name.into();
        let mut bindings = self.bindings.clone();
        bindings.push_front(Binding {
            name: name.clone(),
            values: values.clone(),
        });
        Env {
            bindings,
            index: self.index.update(name, values),
        }
    }

    /// The newest binding of `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&ValueSet> {
        self.index.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Merge two post-branch environments: a name survives only if bound in
    /// both, and its values are unioned. Names bound on one side only are
    /// dropped, so downstream code sees them as unresolved rather than
    /// narrowing on a single branch's guess.
    pub fn merge(&self, other: &Env) -> Env {
        let mut out = Env::new();
        let mut seen = std::collections::HashSet::new();
        let mut picked = Vec::new();
        for binding in self.bindings.iter() {
            if !seen.insert(binding.name.clone()) {
                continue;
            }
            if let Some(theirs) = other.lookup(&binding.name) {
                picked.push((
                    binding.name.clone(),
                    union([binding.values.clone(), theirs.clone()]),
                ));
            }
        }
        // preserve this side's binding order, oldest first
        for (name, values) in picked.into_iter().rev() {
            out = out.extend(name, values);
        }
        out
    }

    /// Bindings newest-first, including shadowed ones.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Visible bindings, oldest-first, shadowed entries skipped.
    pub fn visible(&self) -> Vec<(String, ValueSet)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for binding in self.bindings.iter() {
            if seen.insert(binding.name.clone()) {
                out.push((binding.name.clone(), binding.values.clone()));
            }
        }
        out.reverse();
        out
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Literal, Value};
    use pretty_assertions::assert_eq;

    fn int(i: i64) -> ValueSet {
        ValueSet::unit(Value::Prim(Literal::Int(i)))
    }

    #[test]
    fn extend_does_not_touch_the_original() {
        let base = Env::new().extend("x", int(1));
        let extended = base.extend("y", int(2));
        assert!(base.lookup("y").is_none());
        assert_eq!(extended.lookup("y"), Some(&int(2)));
        assert_eq!(extended.lookup("x"), Some(&int(1)));
    }

    #[test]
    fn newest_binding_shadows() {
        let env = Env::new().extend("x", int(1)).extend("x", int(2));
        assert_eq!(env.lookup("x"), Some(&int(2)));
    }

    #[test]
    fn merge_drops_one_sided_names() {
        let base = Env::new().extend("shared", int(1));
        let left = base.extend("only_left", int(10));
        let right = base.extend("only_right", int(20));
        let merged = left.merge(&right);
        assert!(merged.lookup("only_left").is_none());
        assert!(merged.lookup("only_right").is_none());
        assert!(merged.lookup("shared").is_some());
    }

    #[test]
    fn merge_unions_shared_names() {
        let left = Env::new().extend("x", int(1));
        let right = Env::new().extend("x", int(2));
        let merged = left.merge(&right);
        let set = merged.lookup("x").unwrap();
        assert!(set.contains(&Value::Prim(Literal::Int(1))));
        assert!(set.contains(&Value::Prim(Literal::Int(2))));
    }

    #[test]
    fn merge_uses_the_newest_binding_per_side() {
        let left = Env::new().extend("x", int(1)).extend("x", int(3));
        let right = Env::new().extend("x", int(2));
        let merged = left.merge(&right);
        let set = merged.lookup("x").unwrap();
        assert!(set.contains(&Value::Prim(Literal::Int(3))));
        assert!(set.contains(&Value::Prim(Literal::Int(2))));
        assert!(!set.contains(&Value::Prim(Literal::Int(1))));
    }

    #[test]
    fn visible_skips_shadowed_bindings() {
        let env = Env::new()
            .extend("a", int(1))
            .extend("b", int(2))
            .extend("a", int(3));
        let visible = env.visible();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].0, "b");
        assert_eq!(visible[1].0, "a");
        assert_eq!(visible[1].1, int(3));
    }
}
