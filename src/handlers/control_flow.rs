//! Compound statements: conditionals, loops, exception handling, context managers, pattern
//! matching and the `__main__` guard.
//!
//! Every block follows the same protocol: header at the current depth, suite at depth + 1 via
//! [`EmitContext::body`], continuation clauses (`elif`, `else`, `except`, `finally`) back at the
//! header depth.

use pystep_syntax::{tags, IfStmt, Step};

use super::{present, require, require_all, typed, unexpected};
use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;

/// `else:` clause shared by `if`, `for`, `while` and `try`.
fn else_clause(ctx: &mut EmitContext<'_>, tag: &str, orelse: &Option<Vec<Step>>, lines: &mut Vec<Line>) -> EmitResult<()> {
    if let Some(body) = orelse {
        lines.push(ctx.line("else:"));
        lines.extend(ctx.body(tag, "else", body)?);
    }
    Ok(())
}

/// `keyword cond:` followed by the `elif` chain and the `else` clause.
fn conditional(ctx: &mut EmitContext<'_>, tag: &str, keyword: &str, stmt: &IfStmt) -> EmitResult<Vec<Line>> {
    let condition = require(tag, "condition", &stmt.condition)?;

    let mut lines = vec![ctx.line(format!("{} {}:", keyword, condition))];
    lines.extend(ctx.body(tag, "body", &stmt.body)?);
    for (i, clause) in stmt.elifs.iter().enumerate() {
        let condition = require(tag, &format!("elifs[{}].condition", i), &clause.condition)?;
        lines.push(ctx.line(format!("elif {}:", condition)));
        lines.extend(ctx.body(tag, &format!("elifs[{}].body", i), &clause.body)?);
    }
    else_clause(ctx, tag, &stmt.orelse, &mut lines)?;
    Ok(lines)
}

pub(super) fn if_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::If(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::IF));
    };
    conditional(ctx, tags::IF, "if", stmt)
}

/// Standalone `elif` clause, placed by the caller right after an `if` step.
pub(super) fn elif_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Elif(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::ELIF));
    };
    conditional(ctx, tags::ELIF, "elif", stmt)
}

pub(super) fn else_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Else(body) = step.as_ref() else {
        return Err(unexpected(&step, tags::ELSE));
    };
    let mut lines = vec![ctx.line("else:")];
    lines.extend(ctx.body(tags::ELSE, "body", body)?);
    Ok(lines)
}

pub(super) fn for_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::For(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::FOR));
    };
    let tag = step.tag();
    let target = require(tag, "var", &stmt.target)?;
    let iterable = require(tag, "iterable", &stmt.iterable)?;
    let keyword = if stmt.is_async { "async for" } else { "for" };

    let mut lines = vec![ctx.line(format!("{} {} in {}:", keyword, target, iterable))];
    lines.extend(ctx.body(tag, "body", &stmt.body)?);
    else_clause(ctx, tag, &stmt.orelse, &mut lines)?;
    Ok(lines)
}

pub(super) fn while_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::While(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::WHILE));
    };
    let condition = require(tags::WHILE, "condition", &stmt.condition)?;

    let mut lines = vec![ctx.line(format!("while {}:", condition))];
    lines.extend(ctx.body(tags::WHILE, "body", &stmt.body)?);
    else_clause(ctx, tags::WHILE, &stmt.orelse, &mut lines)?;
    Ok(lines)
}

pub(super) fn try_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Try(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::TRY));
    };
    if stmt.handlers.is_empty() && stmt.finalbody.is_none() {
        return Err(EmitError::malformed(
            tags::TRY,
            "except",
            "requires at least one `except` clause or a `finally` block",
        ));
    }
    if stmt.handlers.is_empty() && stmt.orelse.is_some() {
        return Err(EmitError::malformed(tags::TRY, "else", "requires at least one `except` clause"));
    }

    let mut lines = vec![ctx.line("try:")];
    lines.extend(ctx.body(tags::TRY, "body", &stmt.body)?);
    for (i, handler) in stmt.handlers.iter().enumerate() {
        let header = match (present(&handler.exception), present(&handler.name)) {
            (Some(exc), Some(name)) => format!("except {} as {}:", exc, name),
            (Some(exc), None) => format!("except {}:", exc),
            (None, None) => "except:".to_string(),
            (None, Some(_)) => {
                return Err(EmitError::malformed(
                    tags::TRY,
                    &format!("except[{}].as", i),
                    "requires an exception type",
                ));
            }
        };
        lines.push(ctx.line(header));
        lines.extend(ctx.body(tags::TRY, &format!("except[{}].body", i), &handler.body)?);
    }
    else_clause(ctx, tags::TRY, &stmt.orelse, &mut lines)?;
    if let Some(body) = &stmt.finalbody {
        lines.push(ctx.line("finally:"));
        lines.extend(ctx.body(tags::TRY, "finally", body)?);
    }
    Ok(lines)
}

pub(super) fn with_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::With(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::WITH));
    };
    let tag = step.tag();
    require_all(tag, "context", &stmt.items)?;
    let keyword = if stmt.is_async { "async with" } else { "with" };

    let mut lines = vec![ctx.line(format!("{} {}:", keyword, stmt.items.join(", ")))];
    lines.extend(ctx.body(tag, "body", &stmt.body)?);
    Ok(lines)
}

/// `match subject:` with its `case` steps one level deeper.
pub(super) fn match_stmt(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Match(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::MATCH));
    };
    let subject = require(tags::MATCH, "subject", &stmt.subject)?;
    if stmt.cases.is_empty() {
        return Err(EmitError::malformed(tags::MATCH, "cases", "requires at least one `case`"));
    }
    if let Some(other) = stmt.cases.iter().find(|c| c.tag() != tags::CASE) {
        return Err(EmitError::mismatch(
            tags::MATCH,
            "cases",
            format!("a list of `case` steps, found `{}`", other.tag()),
        ));
    }

    let mut lines = vec![ctx.line(format!("match {}:", subject))];
    let mut scope = ctx.indented();
    lines.extend(scope.dispatch_all("cases", &stmt.cases)?);
    Ok(lines)
}

pub(super) fn case(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Case(case) = step.as_ref() else {
        return Err(unexpected(&step, tags::CASE));
    };
    let mut header = format!("case {}", require(tags::CASE, "pattern", &case.pattern)?);
    if let Some(binding) = present(&case.binding) {
        header.push_str(&format!(" as {}", binding));
    }
    if let Some(guard) = present(&case.guard) {
        header.push_str(&format!(" if {}", guard));
    }
    header.push(':');

    let mut lines = vec![ctx.line(header)];
    lines.extend(ctx.body(tags::CASE, "body", &case.body)?);
    Ok(lines)
}

pub(super) fn main_guard(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::MainGuard(body) = step.as_ref() else {
        return Err(unexpected(&step, tags::MAIN_GUARD));
    };
    let mut lines = vec![ctx.line("if __name__ == '__main__':")];
    lines.extend(ctx.body(tags::MAIN_GUARD, "body", body)?);
    Ok(lines)
}
