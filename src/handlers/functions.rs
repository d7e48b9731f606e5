//! `def` / `async def`, parameter lists and decorators.

use pystep_syntax::{tags, Decorator, Param, Parameters, Step};

use super::markers::docstring_lines;
use super::simple::type_params;
use super::{present, require, typed, unexpected};
use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;

/// `@name` / `@name(args)` at the current depth.
fn decorator_line(ctx: &EmitContext<'_>, tag: &str, attribute: &str, deco: &Decorator) -> EmitResult<Line> {
    let name = require(tag, attribute, &deco.name)?;
    let name = name.strip_prefix('@').unwrap_or(name);
    Ok(match &deco.args {
        Some(args) => ctx.line(format!("@{}({})", name, args.join(", "))),
        None => ctx.line(format!("@{}", name)),
    })
}

/// Decorator lines of a definition, in order.
pub(super) fn decorator_lines(ctx: &EmitContext<'_>, tag: &str, decorators: &[Decorator]) -> EmitResult<Vec<Line>> {
    decorators
        .iter()
        .map(|deco| decorator_line(ctx, tag, "decorators", deco))
        .collect()
}

/// Standalone `decorator` / `decorator_factory` step.
pub(super) fn decorator(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let deco = match step.as_ref() {
        Step::Decorator(deco) | Step::DecoratorFactory(deco) => deco,
        other => return Err(unexpected(other, tags::DECORATOR)),
    };
    Ok(vec![decorator_line(ctx, step.tag(), "name", deco)?])
}

fn param_text(tag: &str, attribute: &str, param: &Param) -> EmitResult<String> {
    let name = require(tag, attribute, &param.name)?;
    Ok(match (present(&param.annotation), present(&param.default)) {
        (Some(ann), Some(default)) => format!("{}: {} = {}", name, ann, default),
        (Some(ann), None) => format!("{}: {}", name, ann),
        (None, Some(default)) => format!("{}={}", name, default),
        (None, None) => name.to_string(),
    })
}

fn star_param(tag: &str, attribute: &str, stars: &str, param: &Param) -> EmitResult<String> {
    if present(&param.default).is_some() {
        return Err(EmitError::malformed(tag, attribute, "cannot have a default"));
    }
    Ok(format!("{}{}", stars, param_text(tag, attribute, param)?))
}

/// Parameter list in signature order: positional-only, `/`, regular, `*args` (or a bare `*`
/// before keyword-only parameters), keyword-only, `**kwargs`.
pub(super) fn signature(tag: &str, params: &Parameters) -> EmitResult<String> {
    let mut parts = Vec::new();
    for p in &params.positional_only {
        parts.push(param_text(tag, "positional_only", p)?);
    }
    if !params.positional_only.is_empty() {
        parts.push("/".to_string());
    }
    for p in &params.args {
        parts.push(param_text(tag, "args", p)?);
    }
    match &params.vararg {
        Some(p) => parts.push(star_param(tag, "vararg", "*", p)?),
        None if !params.keyword_only.is_empty() => parts.push("*".to_string()),
        None => {}
    }
    for p in &params.keyword_only {
        parts.push(param_text(tag, "keyword_only", p)?);
    }
    if let Some(p) = &params.kwarg {
        parts.push(star_param(tag, "kwarg", "**", p)?);
    }
    Ok(parts.join(", "))
}

pub(super) fn function_def(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::FunctionDef(func) = step.as_ref() else {
        return Err(unexpected(&step, tags::FUNC_DEF));
    };
    let tag = step.tag();
    let name = require(tag, "name", &func.name)?;

    let mut header = String::new();
    if func.is_async {
        header.push_str("async ");
    }
    header.push_str(&format!(
        "def {}{}({})",
        name,
        type_params(&func.type_params),
        signature(tag, &func.params)?
    ));
    if let Some(returns) = present(&func.returns) {
        header.push_str(&format!(" -> {}", returns));
    }
    header.push(':');

    let mut lines = decorator_lines(ctx, tag, &func.decorators)?;
    lines.push(ctx.line(header));
    if let Some(doc) = &func.docstring {
        let scope = ctx.indented();
        lines.extend(docstring_lines(&scope, doc));
    }
    lines.extend(ctx.body(tag, "body", &func.body)?);
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_full_order() {
        let params = Parameters {
            positional_only: vec![Param::new("a")],
            args: vec![Param::new("b").annotated("int").with_default("0")],
            vararg: Some(Param::new("args")),
            keyword_only: vec![Param::new("c").with_default("None")],
            kwarg: Some(Param::new("kwargs").annotated("Any")),
        };
        assert_eq!(
            signature("func_def", &params).unwrap(),
            "a, /, b: int = 0, *args, c=None, **kwargs: Any"
        );
    }

    #[test]
    fn test_signature_bare_star_for_keyword_only() {
        let params = Parameters {
            args: vec![Param::new("self")],
            keyword_only: vec![Param::new("strict").annotated("bool").with_default("False")],
            ..Default::default()
        };
        assert_eq!(signature("func_def", &params).unwrap(), "self, *, strict: bool = False");
    }

    #[test]
    fn test_signature_empty() {
        assert_eq!(signature("func_def", &Parameters::default()).unwrap(), "");
    }

    #[test]
    fn test_vararg_default_rejected() {
        let params = Parameters {
            vararg: Some(Param::new("args").with_default("()")),
            ..Default::default()
        };
        assert!(signature("func_def", &params).is_err());
    }
}
