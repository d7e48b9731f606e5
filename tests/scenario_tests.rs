//! End-to-end emission scenarios built from typed steps.
//!
//! Run with: `cargo test --test scenario_tests`

use pystep::syntax::{ClassDef, ClassKind, FieldDecl, FunctionDef, Parameters, Param};
use pystep::{generate, CustomStep, EmitErrorKind, Step};

#[test]
fn function_with_single_expression_body() {
    let program = vec![Step::def("greet", &["name"], vec![Step::expr("print(f\"Hello, {name}!\")")])];
    let out = generate(&program).unwrap();
    insta::assert_snapshot!(out, @r#"
def greet(name):
    print(f"Hello, {name}!")
"#);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn record_class_followed_by_async_function() {
    let record = Step::ClassDef(ClassDef {
        kind: ClassKind::Dataclass { args: vec![] },
        name: "Point".into(),
        fields: vec![
            FieldDecl {
                name: "x".into(),
                annotation: "int".into(),
                default: None,
            },
            FieldDecl {
                name: "y".into(),
                annotation: "int".into(),
                default: Some("0".into()),
            },
        ],
        ..Default::default()
    });
    let fetch = Step::FunctionDef(FunctionDef {
        is_async: true,
        name: "fetch".into(),
        params: Parameters {
            args: vec![Param::new("url").annotated("str")],
            ..Default::default()
        },
        returns: Some("bytes".into()),
        body: vec![Step::ret("await client.get(url)")],
        ..Default::default()
    });

    let out = generate(&[record, fetch]).unwrap();
    insta::assert_snapshot!(out, @r"
@dataclass
class Point:
    x: int
    y: int = 0
async def fetch(url: str) -> bytes:
    return await client.get(url)
");
}

#[test]
fn match_cases_in_order_one_level_deeper() {
    let program = vec![Step::match_(
        "action",
        vec![
            Step::case("'run'", vec![Step::expr("start()")]),
            Step::case("_", vec![Step::expr("stop()")]),
        ],
    )];
    let out = generate(&program).unwrap();
    insta::assert_snapshot!(out, @r"
match action:
    case 'run':
        start()
    case _:
        stop()
");
}

#[test]
fn unknown_construct_fails_without_output() {
    let program = vec![
        Step::expr("print('before')"),
        Step::from(CustomStep::new("unsupported_construct")),
        Step::expr("print('after')"),
    ];
    let err = generate(&program).unwrap_err();
    assert_eq!(
        err.kind,
        EmitErrorKind::UnknownConstruct {
            tag: "unsupported_construct".into()
        }
    );
    assert_eq!(err.path.to_string(), "steps[1] (unsupported_construct)");
}

#[test]
fn empty_if_body_gets_pass() {
    let out = generate(&[Step::if_("ready", vec![])]).unwrap();
    insta::assert_snapshot!(out, @r"
if ready:
    pass
");
}

#[test]
fn siblings_return_to_outer_depth() {
    let program = vec![
        Step::def(
            "outer",
            &[],
            vec![
                Step::for_("item", "items", vec![Step::if_("item", vec![Step::Continue])]),
                Step::ret("None"),
            ],
        ),
        Step::assign("x", "outer()"),
    ];
    let out = generate(&program).unwrap();
    insta::assert_snapshot!(out, @r"
def outer():
    for item in items:
        if item:
            continue
    return None
x = outer()
");
}

#[test]
fn missing_required_field_aborts_call() {
    let program = vec![Step::def("ok", &[], vec![]), Step::if_("", vec![Step::Pass])];
    let err = generate(&program).unwrap_err();
    assert_eq!(
        err.kind,
        EmitErrorKind::MalformedStep {
            tag: "if".into(),
            attribute: "condition".into(),
            reason: "must not be empty".into(),
        }
    );
    assert_eq!(err.path.to_string(), "steps[1] (if)");
}
