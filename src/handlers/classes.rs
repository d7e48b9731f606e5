//! `class` and `@dataclass` definitions.

use pystep_syntax::{tags, ClassKind, Step};

use super::functions::decorator_lines;
use super::markers::docstring_lines;
use super::simple::type_params;
use super::{present, require, typed, unexpected};
use crate::context::EmitContext;
use crate::errors::EmitResult;
use crate::lines::Line;

/// Class suite order: docstring, `__slots__`, annotated fields, then body steps. A `pass` (or
/// an empty-body error) is emitted when there are neither fields nor body steps.
pub(super) fn class_def(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::ClassDef(class) = step.as_ref() else {
        return Err(unexpected(&step, tags::CLASS_DEF));
    };
    let tag = step.tag();
    let name = require(tag, "name", &class.name)?;

    let mut lines = Vec::new();
    if let ClassKind::Dataclass { args } = &class.kind {
        if args.is_empty() {
            lines.push(ctx.line("@dataclass"));
        } else {
            let args: Vec<String> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            lines.push(ctx.line(format!("@dataclass({})", args.join(", "))));
        }
    }
    lines.extend(decorator_lines(ctx, tag, &class.decorators)?);

    let arguments: Vec<String> = class
        .bases
        .iter()
        .cloned()
        .chain(class.keywords.iter().map(|(k, v)| format!("{}={}", k, v)))
        .collect();
    let arguments = if arguments.is_empty() {
        String::new()
    } else {
        format!("({})", arguments.join(", "))
    };
    lines.push(ctx.line(format!("class {}{}{}:", name, type_params(&class.type_params), arguments)));

    {
        let mut scope = ctx.indented();
        if let Some(doc) = &class.docstring {
            lines.extend(docstring_lines(&scope, doc));
        }
        if let Some(slots) = &class.slots {
            let quoted: Vec<String> = slots.iter().map(|s| format!("'{}'", s)).collect();
            lines.push(scope.line(format!("__slots__ = [{}]", quoted.join(", "))));
        }
        for field in &class.fields {
            let field_name = require(tag, "fields", &field.name)?;
            let annotation = require(tag, "fields", &field.annotation)?;
            lines.push(scope.line(match present(&field.default) {
                Some(default) => format!("{}: {} = {}", field_name, annotation, default),
                None => format!("{}: {}", field_name, annotation),
            }));
        }
        lines.extend(scope.dispatch_all("body", &class.body)?);
    }
    if class.fields.is_empty() && class.body.is_empty() {
        lines.extend(ctx.body(tag, "body", &[])?);
    }
    Ok(lines)
}
