//! Extending and overriding construct handlers
//!
//! Run with: `cargo test --test registry_tests`

use std::sync::Arc;

use pystep::{CustomStep, EmitContext, EmitError, EmitErrorKind, EmitResult, Emitter, HandlerRegistry, Line, Step};
use serde_json::json;

/// `for _attempt in range(times):` around a nested body.
fn retry_block(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let Step::Custom(custom) = step else {
        return Err(EmitError::mismatch(step.tag(), "type", "custom step"));
    };
    let times = custom.text("times").map_err(|e| ctx.decode_error(e))?;
    let body = custom.steps("body").map_err(|e| ctx.decode_error(e))?;

    let mut lines = vec![ctx.line(format!("for _attempt in range({}):", times))];
    lines.extend(ctx.body(&custom.tag, "body", &body)?);
    Ok(lines)
}

// ============================================================================
// Private registries
// ============================================================================

#[test]
fn override_builtin_in_private_registry() {
    let mut registry = HandlerRegistry::with_builtins();
    let previous = registry.register("pass", |_, ctx| Ok(vec![ctx.line("...")]));
    assert!(previous.is_some(), "builtin handler should be returned");

    let emitter = Emitter::new().with_registry(Arc::new(registry));
    let out = emitter.generate(&[Step::if_("x", vec![Step::Pass])]).unwrap();
    assert_eq!(out, "if x:\n    ...");

    // The process-wide registry is untouched.
    assert_eq!(pystep::generate(&[Step::Pass]).unwrap(), "pass");
}

#[test]
fn registering_new_tag_returns_none() {
    let mut registry = HandlerRegistry::with_builtins();
    let before = registry.len();
    assert!(registry.register("retry_block", retry_block).is_none());
    assert_eq!(registry.len(), before + 1);
    assert!(registry.contains("retry_block"));
}

#[test]
fn custom_handler_nests_builtin_steps() {
    let mut registry = HandlerRegistry::with_builtins();
    registry.register("retry_block", retry_block);
    let emitter = Emitter::new().with_registry(Arc::new(registry));

    let doc = json!([
        {"type": "func_def", "name": "sync", "body": [
            {"type": "retry_block", "times": 3, "body": [
                {"type": "if", "condition": "attempt()", "body": [{"type": "break"}]}
            ]}
        ]}
    ]);
    let out = emitter.generate_json(&doc).unwrap();
    insta::assert_snapshot!(out, @r"
def sync():
    for _attempt in range(3):
        if attempt():
            break
");
}

#[test]
fn custom_handler_errors_carry_breadcrumb() {
    let mut registry = HandlerRegistry::with_builtins();
    registry.register("retry_block", retry_block);
    let emitter = Emitter::new().with_registry(Arc::new(registry));

    let doc = json!([{"type": "main_guard", "body": [{"type": "retry_block", "body": []}]}]);
    let err = emitter.generate_json(&doc).unwrap_err();
    assert_eq!(
        err.kind,
        EmitErrorKind::MalformedStep {
            tag: "retry_block".into(),
            attribute: "times".into(),
            reason: "is required".into(),
        }
    );
    assert_eq!(err.path.to_string(), "steps[0] (main_guard) > body[0] (retry_block)");
}

#[test]
fn custom_handler_nested_decode_error_is_rooted_at_step() {
    let mut registry = HandlerRegistry::with_builtins();
    registry.register("retry_block", retry_block);
    let emitter = Emitter::new().with_registry(Arc::new(registry));

    let doc = json!([{"type": "retry_block", "times": 2, "body": [{"type": "while", "body": []}]}]);
    let err = emitter.generate_json(&doc).unwrap_err();
    assert_eq!(err.tag(), "while");
    assert_eq!(err.path.to_string(), "steps[0] (retry_block) > body[0] (while)");
}

// ============================================================================
// Hand-built custom steps
// ============================================================================

#[test]
fn custom_step_with_builtin_tag_uses_builtin_handler() {
    let step = Step::from(CustomStep::new("return").with("value", "self._cache"));
    assert_eq!(pystep::generate(&[step]).unwrap(), "return self._cache");
}

#[test]
fn custom_step_with_builtin_tag_reports_missing_attribute() {
    let step = Step::from(CustomStep::new("while").with("body", json!([])));
    let err = pystep::generate(&[step]).unwrap_err();
    assert!(
        matches!(err.kind, EmitErrorKind::MalformedStep { ref attribute, .. } if attribute == "condition"),
        "{}",
        err
    );
    assert_eq!(err.path.to_string(), "steps[0] (while)");
}

// ============================================================================
// Process-wide registry
// ============================================================================

#[test]
fn global_registration_is_visible_to_generate() {
    let previous = pystep::register("registry_tests_todo", |step, ctx| {
        let Step::Custom(custom) = step else {
            return Err(EmitError::mismatch(step.tag(), "type", "custom step"));
        };
        let note = custom.text("note").map_err(|e| ctx.decode_error(e))?;
        Ok(vec![ctx.line(format!("# TODO: {}", note))])
    });
    assert!(previous.is_none());

    let doc = json!([
        {"type": "func_def", "name": "later", "body": [
            {"type": "registry_tests_todo", "note": "implement"},
            {"type": "pass"}
        ]}
    ]);
    let out = Emitter::new().generate_json(&doc).unwrap();
    assert_eq!(out, "def later():\n    # TODO: implement\n    pass");
    assert!(pystep::registry::global_snapshot().contains("registry_tests_todo"));
}
