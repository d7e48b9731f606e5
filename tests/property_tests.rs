//! Property-based tests for the emitter
//!
//! These tests use proptest to verify invariants across many randomly
//! generated step trees, catching edge cases that hand-written tests might miss.

use std::sync::Arc;
use std::thread;

use pystep::{EmitConfig, Emitter, HandlerRegistry, Indent, Step};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_map(|s| s)
}

fn leaf() -> impl Strategy<Value = Step> {
    prop_oneof![
        ident().prop_map(|n| Step::expr(format!("{}()", n))),
        (ident(), ident()).prop_map(|(t, v)| Step::assign(t, v)),
        ident().prop_map(Step::ret),
        Just(Step::Pass),
        Just(Step::Break),
    ]
}

/// Arbitrary nesting of `if` / `while` / `for` / `def` blocks over simple statements.
fn step_tree() -> impl Strategy<Value = Step> {
    leaf().prop_recursive(5, 48, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4);
        prop_oneof![
            (ident(), body.clone()).prop_map(|(c, b)| Step::if_(c, b)),
            (ident(), body.clone()).prop_map(|(c, b)| Step::while_(c, b)),
            (ident(), ident(), body.clone()).prop_map(|(t, i, b)| Step::for_(t, i, b)),
            (ident(), body).prop_map(|(n, b)| Step::def(n, &[], b)),
        ]
    })
}

/// Expected (depth, text) pairs for a tree, computed independently of the emitter.
fn expected_lines(step: &Step, depth: usize, out: &mut Vec<(usize, String)>) {
    let (header, body) = match step {
        Step::If(s) => (format!("if {}:", s.condition), &s.body),
        Step::While(s) => (format!("while {}:", s.condition), &s.body),
        Step::For(s) => (format!("for {} in {}:", s.target, s.iterable), &s.body),
        Step::FunctionDef(f) => (format!("def {}():", f.name), &f.body),
        Step::Expr(e) => return out.push((depth, e.clone())),
        Step::Assign(a) => return out.push((depth, format!("{} = {}", a.targets[0], a.value))),
        Step::Return(Some(v)) => return out.push((depth, format!("return {}", v))),
        Step::Pass => return out.push((depth, "pass".into())),
        Step::Break => return out.push((depth, "break".into())),
        other => panic!("generator produced unexpected step {:?}", other),
    };
    out.push((depth, header));
    if body.is_empty() {
        out.push((depth + 1, "pass".into()));
    }
    for child in body {
        expected_lines(child, depth + 1, out);
    }
}

fn render_expected(steps: &[Step], width: usize) -> String {
    let mut lines = Vec::new();
    for step in steps {
        expected_lines(step, 0, &mut lines);
    }
    lines
        .into_iter()
        .map(|(depth, text)| format!("{}{}", " ".repeat(depth * width), text))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Emission Properties
// =============================================================================

proptest! {
    /// Property: every line is indented exactly by its nesting depth, siblings keep input order,
    /// and empty bodies get a single `pass` one level deeper.
    #[test]
    fn indentation_matches_nesting(program in prop::collection::vec(step_tree(), 1..5), width in 1usize..9) {
        let emitter = Emitter::new().with_config(EmitConfig::new().with_indent_width(width));
        let out = emitter.generate(&program).unwrap();
        prop_assert_eq!(out, render_expected(&program, width));
    }

    /// Property: generation is deterministic.
    #[test]
    fn generation_is_deterministic(program in prop::collection::vec(step_tree(), 0..5)) {
        let first = pystep::generate(&program).unwrap();
        let second = pystep::generate(&program).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: the indent unit is purely presentational.
    #[test]
    fn tabs_and_spaces_agree_modulo_indent(program in prop::collection::vec(step_tree(), 1..4)) {
        let spaces = Emitter::new().generate(&program).unwrap();
        let tabs = Emitter::new()
            .with_config(EmitConfig::new().with_indent(Indent::Tabs))
            .generate(&program)
            .unwrap();
        prop_assert_eq!(spaces, tabs.replace('\t', "    "));
    }

    /// Property: no line ever carries trailing whitespace.
    #[test]
    fn no_trailing_whitespace(program in prop::collection::vec(step_tree(), 1..5)) {
        let out = pystep::generate(&program).unwrap();
        for line in out.lines() {
            prop_assert_eq!(line, line.trim_end());
        }
    }
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_calls_are_independent() {
    let registry = Arc::new(HandlerRegistry::with_builtins());
    let programs: Vec<Vec<Step>> = (0..8)
        .map(|i| {
            let mut body = vec![Step::expr(format!("work({})", i))];
            for depth in 0..i {
                body = vec![Step::if_(format!("level_{}", depth), body)];
            }
            body
        })
        .collect();
    let expected: Vec<String> = programs
        .iter()
        .map(|p| Emitter::new().with_registry(registry.clone()).generate(p).unwrap())
        .collect();

    let handles: Vec<_> = programs
        .into_iter()
        .map(|program| {
            let registry = registry.clone();
            thread::spawn(move || {
                let emitter = Emitter::new().with_registry(registry);
                (0..50).map(|_| emitter.generate(&program).unwrap()).collect::<Vec<_>>()
            })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        for out in handle.join().unwrap() {
            assert_eq!(out, expected);
        }
    }
}

#[test]
fn concurrent_calls_on_global_registry() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let program = vec![Step::def(format!("f{}", i), &[], vec![Step::ret(i.to_string())])];
                pystep::generate(&program).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("def f{}():\n    return {}", i, i));
    }
}
