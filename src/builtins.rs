//! Recognized builtin names.
//!
//! Builtins are opaque: resolving one yields a [`Value::Builtin`] tag so the
//! name does not count as unresolved, and calling one yields an unknown.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::values::Value;

static BUILTIN_NAMES: &[&str] = &[
    "abs",
    "all",
    "any",
    "bool",
    "bytes",
    "callable",
    "chr",
    "dict",
    "dir",
    "enumerate",
    "filter",
    "float",
    "format",
    "frozenset",
    "getattr",
    "hasattr",
    "hash",
    "hex",
    "id",
    "input",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "list",
    "map",
    "max",
    "min",
    "next",
    "object",
    "open",
    "ord",
    "pow",
    "print",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "setattr",
    "sorted",
    "str",
    "sum",
    "super",
    "tuple",
    "type",
    "vars",
    "zip",
    "ArithmeticError",
    "AttributeError",
    "BaseException",
    "Exception",
    "IndexError",
    "IOError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "NameError",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "RuntimeError",
    "StopIteration",
    "TypeError",
    "ValueError",
    "ZeroDivisionError",
];

static BUILTINS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BUILTIN_NAMES.iter().copied().collect());

/// Look a name up in the builtin table.
pub fn probe(name: &str) -> Option<Value> {
    BUILTINS.get(name).map(|tag| Value::Builtin(*tag))
}

/// Canonical tag for a synthesized dictionary method, covering the iterator
/// aliases. `None` means the name is not a dictionary method.
pub fn dict_method(name: &str) -> Option<&'static str> {
    match name {
        "keys" | "iterkeys" => Some("keys"),
        "values" | "itervalues" => Some("values"),
        "items" | "iteritems" => Some("items"),
        "get" => Some("get"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_finds_common_builtins() {
        assert!(matches!(probe("len"), Some(Value::Builtin("len"))));
        assert!(matches!(probe("print"), Some(Value::Builtin("print"))));
        assert!(matches!(probe("ValueError"), Some(Value::Builtin("ValueError"))));
    }

    #[test]
    fn probe_misses_user_names() {
        assert!(probe("definitely_not_builtin").is_none());
        assert!(probe("self").is_none());
    }

    #[test]
    fn dict_method_covers_iterator_aliases() {
        assert_eq!(dict_method("keys"), Some("keys"));
        assert_eq!(dict_method("iterkeys"), Some("keys"));
        assert_eq!(dict_method("itervalues"), Some("values"));
        assert_eq!(dict_method("get"), Some("get"));
        assert_eq!(dict_method("update"), None);
    }
}
