use pysift::*;

fn text(s: &str) -> Value {
    Value::Prim(Literal::Str(s.to_string()))
}

#[test]
fn test_both_arms_assigning_union_at_the_join() {
    let source = r#"
flag = 1
if flag:
    x = 'a'
else:
    x = 'b'
after = x
"#;
    let analysis = analyze_source(source).unwrap();
    let after = analysis.history_for_name("after").unwrap();
    assert!(after.contains(&text("a")), "then-arm value survives the join");
    assert!(after.contains(&text("b")), "else-arm value survives the join");
    assert_eq!(after.len(), 2);
}

#[test]
fn test_one_sided_binding_is_dropped_at_the_join() {
    let source = r#"
flag = 1
if flag:
    only = 'inside'
outside = only
"#;
    let analysis = analyze_source(source).unwrap();
    let outside = analysis.history_for_name("outside").unwrap();
    assert!(
        !outside.contains(&text("inside")),
        "a name bound in one arm only must not leak past the join"
    );
    assert!(matches!(outside.only(), Some(Value::Unknown(_))));
}

#[test]
fn test_code_after_exhaustive_returns_is_unreachable() {
    let source = r#"
def f(p):
    if p:
        return 'yes'
    else:
        return 'no'
    tail = 'dead'

r = f(1)
"#;
    let analysis = analyze_source(source).unwrap();
    let r = analysis.history_for_name("r").unwrap();
    assert!(r.contains(&text("yes")));
    assert!(r.contains(&text("no")));
    assert!(!r.contains(&text("dead")));
    assert!(analysis
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagKind::UnreachableCode));
}

#[test]
fn test_while_else_arms_merge_like_a_branch() {
    let source = r#"
n = 0
while n:
    m = 'body'
else:
    m = 'orelse'
k = m
"#;
    let analysis = analyze_source(source).unwrap();
    let k = analysis.history_for_name("k").unwrap();
    assert!(k.contains(&text("body")));
    assert!(k.contains(&text("orelse")));
    assert_eq!(k.len(), 2);
}

#[test]
fn test_for_target_gets_the_flattened_elements() {
    let source = r#"
total = 'none'
for item in ['a', 'b']:
    total = item
final = total
"#;
    let analysis = analyze_source(source).unwrap();
    let item = analysis.history_for_name("item").unwrap();
    assert!(item.contains(&text("a")));
    assert!(item.contains(&text("b")));
    let final_set = analysis.history_for_name("final").unwrap();
    assert!(final_set.contains(&text("a")));
    assert!(final_set.contains(&text("b")));
    assert!(
        final_set.contains(&text("none")),
        "the zero-iteration path keeps the prior binding"
    );
}

#[test]
fn test_try_finally_merges_both_outcomes() {
    let source = r#"
state = 'start'
try:
    state = 'tried'
finally:
    state = 'cleaned'
end = state
"#;
    let analysis = analyze_source(source).unwrap();
    let end = analysis.history_for_name("end").unwrap();
    assert!(end.contains(&text("tried")));
    assert!(end.contains(&text("cleaned")));
}

#[test]
fn test_except_handlers_contribute_history_but_not_the_merged_env() {
    let source = r#"
r = 'init'
try:
    r = 'ok'
except ValueError:
    r = 'caught'
fin = r
"#;
    let analysis = analyze_source(source).unwrap();
    let fin = analysis.history_for_name("fin").unwrap();
    assert!(fin.contains(&text("ok")));
    assert!(fin.contains(&text("init")));
    let r = analysis.history_for_name("r").unwrap();
    assert!(
        r.contains(&text("caught")),
        "handler assignments still show up in the name history"
    );
}

#[test]
fn test_loop_rebinding_pools_sequences_into_one() {
    let source = r#"
flag = 1
acc = ['seed']
while flag:
    acc = [acc, 'grown']
done = acc
"#;
    let analysis = analyze_source(source).unwrap();
    let done = analysis.history_for_name("done").unwrap();
    assert_eq!(done.len(), 1, "all sequence candidates fuse into one");
    match done.only() {
        Some(Value::Seq(seq)) => {
            assert_eq!(seq.elems.len(), 3);
            assert!(seq.elems.iter().any(|e| e.contains(&text("seed"))));
            assert!(seq.elems.iter().any(|e| e.contains(&text("grown"))));
        }
        other => panic!("expected a pooled sequence, got {other:?}"),
    }
}
