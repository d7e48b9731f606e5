//! Single-line statements: bindings, expression statements and control transfer.

use pystep_syntax::{tags, CompKind, DynamicKind, Step};

use super::{assigned, present, require, require_all, typed, unexpected};
use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;

// ============================================================================
// Bindings
// ============================================================================

pub(super) fn assign(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Assign(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::ASSIGN));
    };
    require_all(tags::ASSIGN, "target", &stmt.targets)?;
    let value = require(tags::ASSIGN, "value", &stmt.value)?;
    let mut text = format!("{} = {}", stmt.targets.join(", "), value);
    if let Some(comment) = present(&stmt.type_comment) {
        text.push_str("  # type: ");
        text.push_str(comment);
    }
    Ok(vec![ctx.line(text)])
}

pub(super) fn annotation(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Annotation(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::ANNOTATION));
    };
    let target = require(tags::ANNOTATION, "target", &stmt.target)?;
    let annotation = require(tags::ANNOTATION, "annotation", &stmt.annotation)?;
    let text = match present(&stmt.value) {
        Some(value) => format!("{}: {} = {}", target, annotation, value),
        None => format!("{}: {}", target, annotation),
    };
    Ok(vec![ctx.line(text)])
}

pub(super) fn aug_assign(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::AugAssign(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::AUG_ASSIGN));
    };
    let target = require(tags::AUG_ASSIGN, "target", &stmt.target)?;
    let op = require(tags::AUG_ASSIGN, "op", &stmt.op)?.trim();
    let value = require(tags::AUG_ASSIGN, "value", &stmt.value)?;
    let op = if op.ends_with('=') { op.to_string() } else { format!("{}=", op) };
    Ok(vec![ctx.line(format!("{} {} {}", target, op, value))])
}

pub(super) fn dunder(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Dunder(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::DUNDER));
    };
    let name = require(tags::DUNDER, "name", &stmt.name)?;
    let value = require(tags::DUNDER, "value", &stmt.value)?;
    Ok(vec![ctx.line(format!("{} = {}", name, value))])
}

pub(super) fn type_alias(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::TypeAlias(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::TYPE_ALIAS));
    };
    let name = require(tags::TYPE_ALIAS, "name", &stmt.name)?;
    let value = require(tags::TYPE_ALIAS, "expr", &stmt.value)?;
    Ok(vec![ctx.line(format!(
        "type {}{} = {}",
        name,
        type_params(&stmt.type_params),
        value
    ))])
}

/// `[T, U]` for PEP 695 type parameters, empty when there are none.
pub(super) fn type_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("[{}]", params.join(", "))
    }
}

/// Bare `[T, U]` parameter list statement.
pub(super) fn type_params_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::TypeParams(params) = step.as_ref() else {
        return Err(unexpected(&step, tags::TYPE_PARAMS));
    };
    require_all(tags::TYPE_PARAMS, "params", params)?;
    Ok(vec![ctx.line(format!("{}  # type parameters", type_params(params)))])
}

// ============================================================================
// Expression statements
// ============================================================================

pub(super) fn expr(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Expr(expr) = step.as_ref() else {
        return Err(unexpected(&step, tags::EXPR));
    };
    let expr = require(tags::EXPR, "expr", expr)?;
    Ok(vec![ctx.line(expr)])
}

pub(super) fn func_call(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::FuncCall(call) = step.as_ref() else {
        return Err(unexpected(&step, tags::FUNC_CALL));
    };
    let func = require(tags::FUNC_CALL, "name", &call.func)?;
    let args = call
        .args
        .iter()
        .cloned()
        .chain(call.kwargs.iter().map(|(k, v)| format!("{}={}", k, v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(vec![ctx.line(assigned(&call.target, format!("{}({})", func, args)))])
}

pub(super) fn lambda(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Lambda(lambda) = step.as_ref() else {
        return Err(unexpected(&step, tags::LAMBDA));
    };
    let body = require(tags::LAMBDA, "expr", &lambda.body)?;
    let text = if lambda.params.is_empty() {
        format!("lambda: {}", body)
    } else {
        format!("lambda {}: {}", lambda.params.join(", "), body)
    };
    Ok(vec![ctx.line(assigned(&lambda.target, text))])
}

/// `for var in iterable[ if cond]` shared by every comprehension form.
fn comprehension_clause(tag: &str, var: &str, iterable: &str, condition: &Option<String>) -> EmitResult<String> {
    let var = require(tag, "var", var)?;
    let iterable = require(tag, "iterable", iterable)?;
    Ok(match present(condition) {
        Some(cond) => format!("for {} in {} if {}", var, iterable, cond),
        None => format!("for {} in {}", var, iterable),
    })
}

pub(super) fn comprehension(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Comprehension(comp) = step.as_ref() else {
        return Err(unexpected(&step, tags::LIST_COMP));
    };
    let tag = step.tag();
    let element = require(tag, "expr", &comp.element)?;
    let clause = comprehension_clause(tag, &comp.var, &comp.iterable, &comp.condition)?;
    let text = match comp.kind {
        CompKind::List => format!("[{} {}]", element, clause),
        CompKind::Set => format!("{{{} {}}}", element, clause),
        CompKind::Generator => format!("({} {})", element, clause),
    };
    Ok(vec![ctx.line(assigned(&comp.target, text))])
}

pub(super) fn dict_comp(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::DictComp(comp) = step.as_ref() else {
        return Err(unexpected(&step, tags::DICT_COMP));
    };
    let key = require(tags::DICT_COMP, "key", &comp.key)?;
    let value = require(tags::DICT_COMP, "value", &comp.value)?;
    let clause = comprehension_clause(tags::DICT_COMP, &comp.var, &comp.iterable, &comp.condition)?;
    let text = format!("{{{}: {} {}}}", key, value, clause);
    Ok(vec![ctx.line(assigned(&comp.target, text))])
}

pub(super) fn walrus(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Walrus(walrus) = step.as_ref() else {
        return Err(unexpected(&step, tags::WALRUS));
    };
    let target = require(tags::WALRUS, "target", &walrus.target)?;
    let value = require(tags::WALRUS, "expr", &walrus.value)?;
    Ok(vec![ctx.line(format!("({} := {})", target, value))])
}

pub(super) fn fstring_debug(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::FStringDebug(expr) = step.as_ref() else {
        return Err(unexpected(&step, tags::FSTRING_DEBUG));
    };
    let expr = require(tags::FSTRING_DEBUG, "expr", expr)?;
    Ok(vec![ctx.line(format!("f\"{{{}=}}\"", expr))])
}

pub(super) fn cond_expr(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::CondExpr(cond) = step.as_ref() else {
        return Err(unexpected(&step, tags::COND_EXPR));
    };
    let then = require(tags::COND_EXPR, "then", &cond.then)?;
    let condition = require(tags::COND_EXPR, "cond", &cond.condition)?;
    let orelse = require(tags::COND_EXPR, "else", &cond.orelse)?;
    let text = format!("{} if {} else {}", then, condition, orelse);
    Ok(vec![ctx.line(assigned(&cond.target, text))])
}

pub(super) fn chained_comparison(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::ChainedComparison(chain) = step.as_ref() else {
        return Err(unexpected(&step, tags::CHAINED_COMPARISON));
    };
    require_all(tags::CHAINED_COMPARISON, "comparisons", &chain.parts)?;
    Ok(vec![ctx.line(assigned(&chain.target, chain.parts.join(" ")))])
}

/// `exec(...)` / `eval(...)`; locals without globals passes `None` for globals.
pub(super) fn dynamic(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Dynamic(code) = step.as_ref() else {
        return Err(unexpected(&step, tags::EXEC));
    };
    let tag = step.tag();
    let source = require(tag, "expr", &code.source)?;
    let mut args = vec![source.to_string()];
    match (present(&code.globals), present(&code.locals)) {
        (Some(globals), Some(locals)) => args.extend([globals.to_string(), locals.to_string()]),
        (Some(globals), None) => args.push(globals.to_string()),
        (None, Some(locals)) => args.extend(["None".to_string(), locals.to_string()]),
        (None, None) => {}
    }
    let func = match code.kind {
        DynamicKind::Exec => "exec",
        DynamicKind::Eval => "eval",
    };
    Ok(vec![ctx.line(assigned(&code.target, format!("{}({})", func, args.join(", "))))])
}

// ============================================================================
// Control transfer
// ============================================================================

/// `keyword` or `keyword value`.
fn keyword_with(keyword: &str, value: &Option<String>) -> String {
    match present(value) {
        Some(value) => format!("{} {}", keyword, value),
        None => keyword.to_string(),
    }
}

pub(super) fn return_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Return(value) = step.as_ref() else {
        return Err(unexpected(&step, tags::RETURN));
    };
    Ok(vec![ctx.line(keyword_with("return", value))])
}

pub(super) fn yield_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Yield(value) = step.as_ref() else {
        return Err(unexpected(&step, tags::YIELD));
    };
    Ok(vec![ctx.line(keyword_with("yield", value))])
}

pub(super) fn yield_from(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::YieldFrom(expr) = step.as_ref() else {
        return Err(unexpected(&step, tags::YIELD_FROM));
    };
    let expr = require(tags::YIELD_FROM, "expr", expr)?;
    Ok(vec![ctx.line(format!("yield from {}", expr))])
}

pub(super) fn raise(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Raise(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::RAISE));
    };
    let text = match (present(&stmt.exception), present(&stmt.cause)) {
        (Some(exc), Some(cause)) => format!("raise {} from {}", exc, cause),
        (Some(exc), None) => format!("raise {}", exc),
        (None, None) => "raise".to_string(),
        (None, Some(_)) => {
            return Err(EmitError::malformed(
                tags::RAISE,
                "exception",
                "is required when `from` is given",
            ));
        }
    };
    Ok(vec![ctx.line(text)])
}

pub(super) fn assert(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Assert(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::ASSERT));
    };
    let condition = require(tags::ASSERT, "condition", &stmt.condition)?;
    let text = match present(&stmt.message) {
        Some(msg) => format!("assert {}, {}", condition, msg),
        None => format!("assert {}", condition),
    };
    Ok(vec![ctx.line(text)])
}

pub(super) fn await_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Await(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::AWAIT));
    };
    let expr = require(tags::AWAIT, "expr", &stmt.expr)?;
    Ok(vec![ctx.line(assigned(&stmt.target, format!("await {}", expr)))])
}

/// `break`, `continue`, `pass`.
pub(super) fn keyword(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let keyword = match step.as_ref() {
        Step::Break => "break",
        Step::Continue => "continue",
        Step::Pass => "pass",
        other => return Err(unexpected(other, tags::PASS)),
    };
    Ok(vec![ctx.line(keyword)])
}

/// `del`, `global`, `nonlocal` over a comma-separated name list.
pub(super) fn name_list(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let (keyword, attribute, names) = match step.as_ref() {
        Step::Del(targets) => ("del", "target", targets),
        Step::Global(names) => ("global", "names", names),
        Step::Nonlocal(names) => ("nonlocal", "names", names),
        other => return Err(unexpected(other, tags::DEL)),
    };
    require_all(keyword, attribute, names)?;
    Ok(vec![ctx.line(format!("{} {}", keyword, names.join(", ")))])
}
