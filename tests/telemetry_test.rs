use pysift::*;

fn text(s: &str) -> Value {
    Value::Prim(Literal::Str(s.to_string()))
}

#[test]
fn test_method_invocations_carry_constructor_and_call_arguments() {
    let source = r#"
class A:
    def __init__(self, tag):
        self.tag = tag

    def m(self, payload):
        return payload

a = A('t')
r = a.m('s')
"#;
    let analysis = analyze_source(source).unwrap();
    assert_eq!(analysis.history_for_name("r").unwrap().only(), Some(&text("s")));

    let invocations = analysis.telemetry().for_class("A");
    assert_eq!(invocations.len(), 2, "one for __init__, one for m");

    let init = &invocations[0];
    assert_eq!(init.methods, vec!["__init__".to_string()]);
    assert!(init.ctor_args[0].contains(&text("t")));
    assert!(init.call_args[0].contains(&text("t")));

    let call = &invocations[1];
    assert_eq!(call.methods, vec!["m".to_string()]);
    assert!(call.ctor_args[0].contains(&text("t")));
    assert!(call.call_args[0].contains(&text("s")));
}

#[test]
fn test_calls_without_positional_arguments_are_not_recorded() {
    let source = r#"
class B:
    def quiet(self):
        return 'q'

b = B()
out = b.quiet()
"#;
    let analysis = analyze_source(source).unwrap();
    assert_eq!(analysis.history_for_name("out").unwrap().only(), Some(&text("q")));
    assert!(analysis.telemetry().is_empty());
}

#[test]
fn test_invocations_snapshot_the_caller_environment() {
    let source = r#"
class A:
    def m(self, payload):
        return payload

a = A()
r = a.m('s')
"#;
    let analysis = analyze_source(source).unwrap();
    let invocations = analysis.telemetry().for_class("A");
    assert_eq!(invocations.len(), 1);
    assert!(
        invocations[0].env.lookup("a").is_some(),
        "the receiver binding is visible in the recorded environment"
    );
}

#[test]
fn test_bound_method_arguments_are_flattened_to_their_callables() {
    let source = r#"
class C:
    def cb(self):
        return 1

    def run(self, f):
        return f

c = C()
out = c.run(c.cb)
"#;
    let analysis = analyze_source(source).unwrap();
    let invocations = analysis.telemetry().for_class("C");
    let run = invocations
        .iter()
        .find(|inv| inv.methods == vec!["run".to_string()])
        .unwrap();
    assert!(run.call_args[0].iter().any(|v| matches!(v, Value::Closure(_))));
    assert!(!run.call_args[0].iter().any(|v| matches!(v, Value::BoundMethod(_))));
}

#[test]
fn test_instances_are_distinguished_by_their_constructor_arguments() {
    let source = r#"
class W:
    def __init__(self, n):
        self.n = n

    def go(self, x):
        return x

w1 = W('one')
w2 = W('two')
r1 = w1.go('a')
r2 = w2.go('b')
"#;
    let analysis = analyze_source(source).unwrap();
    let gos: Vec<_> = analysis
        .telemetry()
        .for_class("W")
        .iter()
        .filter(|inv| inv.methods == vec!["go".to_string()])
        .collect();
    assert_eq!(gos.len(), 2);
    assert!(gos
        .iter()
        .any(|inv| inv.ctor_args[0].contains(&text("one")) && inv.call_args[0].contains(&text("a"))));
    assert!(gos
        .iter()
        .any(|inv| inv.ctor_args[0].contains(&text("two")) && inv.call_args[0].contains(&text("b"))));
}
