//! Blank lines, comments, docstrings and type pragmas.

use pystep_syntax::decode::MAX_BLANK_LINES;
use pystep_syntax::{tags, Step};

use super::{require, typed, unexpected};
use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;

pub(super) fn blank_line(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::BlankLine(count) = step.as_ref() else {
        return Err(unexpected(&step, tags::BLANK_LINE));
    };
    if *count > MAX_BLANK_LINES {
        return Err(EmitError::malformed(
            tags::BLANK_LINE,
            "count",
            format!("must be at most {}", MAX_BLANK_LINES),
        ));
    }
    Ok(vec![ctx.blank(); *count])
}

/// One `# ...` line per line of text.
pub(super) fn comment(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Comment(text) = step.as_ref() else {
        return Err(unexpected(&step, tags::COMMENT));
    };
    if text.is_empty() {
        return Ok(vec![ctx.line("#")]);
    }
    Ok(text
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() { ctx.line("#") } else { ctx.line(format!("# {}", line)) }
        })
        .collect())
}

/// Escape text for a `"""` literal: inner triple quotes, and a trailing quote or backslash that
/// would merge with the closing delimiter.
fn escape_docstring(text: &str) -> String {
    let mut escaped = text.replace("\"\"\"", "\\\"\\\"\\\"");
    let trailing = escaped.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        escaped.push('\\');
    }
    if let Some(body) = escaped.strip_suffix('"') {
        let run = body.chars().rev().take_while(|&c| c == '\\').count();
        if run % 2 == 0 {
            escaped.pop();
            escaped.push_str("\\\"");
        }
    }
    escaped
}

/// Docstring lines at the context's depth; multi-line text keeps its line breaks.
pub(super) fn docstring_lines(ctx: &EmitContext<'_>, text: &str) -> Vec<Line> {
    let escaped = escape_docstring(text);
    let raw: Vec<&str> = escaped.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let last = raw.len() - 1;
    raw.iter()
        .enumerate()
        .map(|(i, line)| {
            let mut text = String::new();
            if i == 0 {
                text.push_str("\"\"\"");
            }
            text.push_str(line);
            if i == last {
                text.push_str("\"\"\"");
            }
            ctx.line(text)
        })
        .collect()
}

pub(super) fn docstring(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Docstring(text) = step.as_ref() else {
        return Err(unexpected(&step, tags::DOCSTRING));
    };
    Ok(docstring_lines(ctx, text))
}

pub(super) fn mypy_pragma(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::MypyPragma(pragma) = step.as_ref() else {
        return Err(unexpected(&step, tags::MYPY_PRAGMA));
    };
    let pragma = require(tags::MYPY_PRAGMA, "pragma", pragma)?;
    Ok(vec![ctx.line(format!("# type: {}", pragma))])
}
