use pysift::*;

fn int(i: i64) -> Value {
    Value::Prim(Literal::Int(i))
}

fn text(s: &str) -> Value {
    Value::Prim(Literal::Str(s.to_string()))
}

#[test]
fn test_repeated_literal_keys_keep_the_last_value() {
    let source = r#"
d = {'k': 'old', 'k': 'new'}
got = d.get('k')
"#;
    let analysis = analyze_source(source).unwrap();
    let got = analysis.history_for_name("got").unwrap();
    assert_eq!(got.only(), Some(&text("new")));
}

#[test]
fn test_dict_views_reflect_the_entries() {
    let source = r#"
d = {'a': 1, 'b': 2}
ks = d.keys()
vs = d.values()
its = d.items()
"#;
    let analysis = analyze_source(source).unwrap();
    let ks = analysis.history_for_name("ks").unwrap();
    assert!(ks.contains(&text("a")));
    assert!(ks.contains(&text("b")));

    let vs = analysis.history_for_name("vs").unwrap();
    assert!(vs.contains(&int(1)));
    assert!(vs.contains(&int(2)));

    let its = analysis.history_for_name("its").unwrap();
    assert_eq!(its.len(), 2);
    for pair in its.iter() {
        match pair {
            Value::Seq(seq) => assert_eq!(seq.elems.len(), 2),
            other => panic!("expected key/value pairs, got {other}"),
        }
    }
}

#[test]
fn test_python2_iterator_views_are_aliases() {
    let source = r#"
d = {'x': 5}
a = d.iterkeys()
b = d.itervalues()
c = d.iteritems()
"#;
    let analysis = analyze_source(source).unwrap();
    assert!(analysis.history_for_name("a").unwrap().contains(&text("x")));
    assert!(analysis.history_for_name("b").unwrap().contains(&int(5)));
    assert!(matches!(
        analysis.history_for_name("c").unwrap().only(),
        Some(Value::Seq(_))
    ));
}

#[test]
fn test_abstract_keys_stay_as_separate_entries() {
    let source = r#"
d = {key_a: 1, key_b: 2}
vs = d.values()
"#;
    let analysis = analyze_source(source).unwrap();
    let vs = analysis.history_for_name("vs").unwrap();
    assert!(vs.contains(&int(1)), "entries under abstract keys are kept");
    assert!(vs.contains(&int(2)));
}

#[test]
fn test_dict_subscript_pools_every_value() {
    let source = r#"
d = {'a': 'x', 'b': 'y'}
one = d['a']
"#;
    let analysis = analyze_source(source).unwrap();
    let one = analysis.history_for_name("one").unwrap();
    assert!(one.contains(&text("x")));
    assert!(
        one.contains(&text("y")),
        "an abstract lookup answers with every stored value"
    );
}

#[test]
fn test_tuple_unpacking_distributes_elements() {
    let analysis = analyze_source("a, b = 'left', 'right'\n").unwrap();
    assert_eq!(
        analysis.history_for_name("a").unwrap().only(),
        Some(&text("left"))
    );
    assert_eq!(
        analysis.history_for_name("b").unwrap().only(),
        Some(&text("right"))
    );
}

#[test]
fn test_nested_unpacking_recurses() {
    let analysis = analyze_source("(a, (b, c)) = ('x', ('y', 'z'))\n").unwrap();
    assert_eq!(
        analysis.history_for_name("b").unwrap().only(),
        Some(&text("y"))
    );
    assert_eq!(
        analysis.history_for_name("c").unwrap().only(),
        Some(&text("z"))
    );
}

#[test]
fn test_unpacking_arity_mismatch_is_reported() {
    let source = r#"
pair = ('a', 'b', 'c')
x, y = pair
"#;
    let analysis = analyze_source(source).unwrap();
    let diags = analysis.diagnostics();
    assert!(diags
        .iter()
        .any(|d| d.kind == DiagKind::UnpackMismatch && d.detail.contains("too many")));
}

#[test]
fn test_unpacking_a_scalar_is_reported() {
    let source = r#"
n = 5
x, y = n
"#;
    let analysis = analyze_source(source).unwrap();
    assert!(analysis
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagKind::NotIterable));
}

#[test]
fn test_an_empty_dict_literal_has_no_entries() {
    let source = r#"
d = {}
ks = d.keys()
"#;
    let analysis = analyze_source(source).unwrap();
    match analysis.history_for_name("d").unwrap().only() {
        Some(Value::Dict(dict)) => assert!(dict.entries.is_empty()),
        other => panic!("expected a dict, got {other:?}"),
    }
    assert!(analysis.history_for_name("ks").unwrap().is_empty());
}

#[test]
fn test_integer_keyed_dict_views() {
    let source = r#"
d = {1: 2, 3: 4}
ks = d.keys()
vs = d.values()
got = d.get(1)
"#;
    let analysis = analyze_source(source).unwrap();
    let ks = analysis.history_for_name("ks").unwrap();
    assert!(ks.contains(&int(1)));
    assert!(ks.contains(&int(3)));
    let vs = analysis.history_for_name("vs").unwrap();
    assert!(vs.contains(&int(2)));
    assert!(vs.contains(&int(4)));
    let got = analysis.history_for_name("got").unwrap();
    assert!(got.contains(&int(2)));
    assert!(got.contains(&int(4)));
}

#[test]
fn test_tuple_for_targets_unpack_item_pairs() {
    let source = r#"
d = {'k1': 'v1', 'k2': 'v2'}
for k, v in d.items():
    kk = k
    vv = v
"#;
    let analysis = analyze_source(source).unwrap();
    let k = analysis.history_for_name("k").unwrap();
    assert!(k.contains(&text("k1")));
    assert!(k.contains(&text("k2")));
    let v = analysis.history_for_name("v").unwrap();
    assert!(v.contains(&text("v1")));
    assert!(v.contains(&text("v2")));
    assert!(!v.contains(&text("k1")), "keys and values stay separated");
}

#[test]
fn test_iterating_a_dict_yields_its_keys() {
    let source = r#"
d = {'one': 1}
for k in d:
    seen = k
"#;
    let analysis = analyze_source(source).unwrap();
    let seen = analysis.history_for_name("seen").unwrap();
    assert!(seen.contains(&text("one")));
    assert!(!seen.contains(&int(1)));
}
