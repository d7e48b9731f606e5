//! Built-in construct handlers
//!
//! One handler per canonical tag in [`pystep_syntax::tags::CONSTRUCTS`], grouped by construct
//! family:
//!
//! - `module` - file markers and imports
//! - `simple` - bindings, expression statements and control transfer
//! - `functions` - `def` / `async def` and decorators, standalone decorator lines
//! - `classes` - `class` and `@dataclass`
//! - `control_flow` - `if`, loops, `try`, `with`, `match`, main guard
//! - `markers` - blank lines, comments, docstrings, type pragmas
//!
//! Every handler accepts either its typed [`Step`] variant or a hand-built [`Step::Custom`]
//! carrying the handler's tag; the latter is decoded into the typed variant first.

use std::borrow::Cow;

use pystep_syntax::{tags, Step};

use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;
use crate::registry::HandlerRegistry;

mod classes;
mod control_flow;
mod functions;
mod markers;
mod module;
mod simple;

type BuiltinHandler = fn(&Step, &mut EmitContext<'_>) -> EmitResult<Vec<Line>>;

const BUILTINS: &[(&str, BuiltinHandler)] = &[
    // Module markers / imports
    (tags::SHEBANG, module::shebang),
    (tags::ENCODING, module::encoding),
    (tags::IMPORT, module::import),
    (tags::FROM_IMPORT, module::from_import),
    (tags::FUTURE_IMPORT, module::future_import),
    (tags::IMPORTLIB_IMPORT, module::importlib_import),
    // Bindings
    (tags::ASSIGN, simple::assign),
    (tags::ANNOTATION, simple::annotation),
    (tags::AUG_ASSIGN, simple::aug_assign),
    (tags::DUNDER, simple::dunder),
    (tags::TYPE_ALIAS, simple::type_alias),
    // Expression statements
    (tags::EXPR, simple::expr),
    (tags::FUNC_CALL, simple::func_call),
    (tags::LAMBDA, simple::lambda),
    (tags::LIST_COMP, simple::comprehension),
    (tags::SET_COMP, simple::comprehension),
    (tags::GENERATOR_EXPR, simple::comprehension),
    (tags::DICT_COMP, simple::dict_comp),
    (tags::WALRUS, simple::walrus),
    (tags::FSTRING_DEBUG, simple::fstring_debug),
    (tags::COND_EXPR, simple::cond_expr),
    (tags::CHAINED_COMPARISON, simple::chained_comparison),
    (tags::EXEC, simple::dynamic),
    (tags::EVAL, simple::dynamic),
    // Definitions
    (tags::FUNC_DEF, functions::function_def),
    (tags::ASYNC_FUNC_DEF, functions::function_def),
    (tags::CLASS_DEF, classes::class_def),
    (tags::DATACLASS, classes::class_def),
    (tags::DECORATOR, functions::decorator),
    (tags::DECORATOR_FACTORY, functions::decorator),
    (tags::TYPE_PARAMS, simple::type_params_stmt),
    // Compound statements
    (tags::IF, control_flow::if_stmt),
    (tags::ELIF, control_flow::elif_stmt),
    (tags::ELSE, control_flow::else_stmt),
    (tags::FOR, control_flow::for_stmt),
    (tags::ASYNC_FOR, control_flow::for_stmt),
    (tags::WHILE, control_flow::while_stmt),
    (tags::TRY, control_flow::try_stmt),
    (tags::WITH, control_flow::with_stmt),
    (tags::ASYNC_WITH, control_flow::with_stmt),
    (tags::MATCH, control_flow::match_stmt),
    (tags::CASE, control_flow::case),
    (tags::MAIN_GUARD, control_flow::main_guard),
    // Control transfer
    (tags::RETURN, simple::return_stmt),
    (tags::RAISE, simple::raise),
    (tags::ASSERT, simple::assert),
    (tags::YIELD, simple::yield_stmt),
    (tags::YIELD_FROM, simple::yield_from),
    (tags::AWAIT, simple::await_stmt),
    (tags::BREAK, simple::keyword),
    (tags::CONTINUE, simple::keyword),
    (tags::PASS, simple::keyword),
    (tags::DEL, simple::name_list),
    (tags::GLOBAL, simple::name_list),
    (tags::NONLOCAL, simple::name_list),
    // Markers
    (tags::BLANK_LINE, markers::blank_line),
    (tags::COMMENT, markers::comment),
    (tags::DOCSTRING, markers::docstring),
    (tags::MYPY_PRAGMA, markers::mypy_pragma),
];

pub(crate) fn register_builtins(registry: &mut HandlerRegistry) {
    for &(tag, handler) in BUILTINS {
        registry.register(tag, handler);
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Typed view of `step`: a custom step is decoded as the construct named by its own tag.
fn typed<'s>(step: &'s Step, ctx: &EmitContext<'_>) -> EmitResult<Cow<'s, Step>> {
    match step {
        Step::Custom(custom) => Step::from_custom_as(custom, &custom.tag)
            .map(Cow::Owned)
            .map_err(|e| ctx.decode_error(e)),
        other => Ok(Cow::Borrowed(other)),
    }
}

/// Error for a step routed to a handler of another construct.
fn unexpected(step: &Step, expected: &str) -> EmitError {
    EmitError::mismatch(step.tag(), "type", format!("a `{}` step", expected))
}

/// Required text must not be blank.
fn require<'a>(tag: &str, attribute: &str, text: &'a str) -> EmitResult<&'a str> {
    if text.trim().is_empty() {
        return Err(EmitError::malformed(tag, attribute, "must not be empty"));
    }
    Ok(text)
}

/// Required list must have at least one entry, and no blank entries.
fn require_all(tag: &str, attribute: &str, items: &[String]) -> EmitResult<()> {
    if items.is_empty() {
        return Err(EmitError::malformed(tag, attribute, "must not be empty"));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(EmitError::malformed(tag, attribute, "must not contain empty entries"));
    }
    Ok(())
}

/// Optional text, with blank treated as absent.
fn present(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

/// `target = expr` when a target is given, otherwise the bare expression.
fn assigned(target: &Option<String>, expr: String) -> String {
    match present(target) {
        Some(target) => format!("{} = {}", target, expr),
        None => expr,
    }
}
