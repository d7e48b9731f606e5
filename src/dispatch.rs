//! Step dispatch: resolve a step's handler by tag and invoke it.

use pystep_syntax::Step;

use crate::context::EmitContext;
use crate::errors::EmitResult;
use crate::lines::Line;

/// Render one step at the context's current depth.
///
/// Fails with `UnknownConstruct` naming the exact tag when no handler is registered. Errors
/// raised by the handler get the current breadcrumb unless a nested step already attached one.
pub fn dispatch(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let tag = step.tag();
    tracing::trace!(tag, depth = ctx.depth(), "dispatch step");
    let handler = ctx.registry().resolve(tag).map_err(|e| e.or_path(ctx.path()))?;
    handler(step, ctx).map_err(|e| e.or_path(ctx.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitConfig;
    use crate::errors::EmitErrorKind;
    use crate::registry::HandlerRegistry;

    #[test]
    fn test_dispatch_uses_registered_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register("hello", |_: &Step, ctx: &mut EmitContext<'_>| Ok(vec![ctx.line("print('hello')")]));
        let config = EmitConfig::default();
        let mut ctx = EmitContext::new(&registry, &config);
        let lines = dispatch(&Step::from(pystep_syntax::CustomStep::new("hello")), &mut ctx).unwrap();
        assert_eq!(lines, vec![Line::code(0, "print('hello')")]);
    }

    #[test]
    fn test_dispatch_unknown_tag_is_exact() {
        let registry = HandlerRegistry::with_builtins();
        let config = EmitConfig::default();
        let mut ctx = EmitContext::new(&registry, &config);
        let step = Step::from(pystep_syntax::CustomStep::new("Pass"));
        let err = dispatch(&step, &mut ctx).unwrap_err();
        assert_eq!(err.kind, EmitErrorKind::UnknownConstruct { tag: "Pass".into() });
    }
}
