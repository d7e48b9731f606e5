//! Handler registry: tag -> rendering function
//!
//! A [`HandlerRegistry`] maps step tags to handlers. [`HandlerRegistry::with_builtins`] binds every
//! built-in construct; callers may add handlers for new tags or override built-in ones.
//!
//! ## Process-wide registry
//!
//! [`register`] and [`crate::generate`] share one lazily initialized registry behind an `RwLock`.
//! A `generate` call holds the read lock for its whole traversal, so a concurrent `register`
//! waits until in-flight calls finish and never observes a half-built call. Handlers must not
//! call [`register`] themselves.
//!
//! ## Examples
//! ```rust
//! use pystep::{EmitContext, HandlerRegistry, Line, Step};
//!
//! let mut registry = HandlerRegistry::with_builtins();
//! registry.register("todo", |step: &Step, ctx: &mut EmitContext<'_>| {
//!     let Step::Custom(custom) = step else { unreachable!() };
//!     Ok(vec![ctx.line(format!("# TODO: {}", custom.text("text")?))])
//! });
//! assert!(registry.contains("todo"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use pystep_syntax::Step;

use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::handlers;
use crate::lines::Line;

/// Rendering function for one construct.
///
/// Receives the step and the call's context; returns the step's lines at the context depth.
pub type Handler = Arc<dyn Fn(&Step, &mut EmitContext<'_>) -> EmitResult<Vec<Line>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry").field("tags", &self.tags()).finish()
    }
}

impl HandlerRegistry {
    /// Empty registry, no constructs bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in construct bound.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        handlers::register_builtins(&mut registry);
        registry
    }

    /// Bind `tag` to `handler`, returning the handler it replaces.
    pub fn register<F>(&mut self, tag: impl Into<String>, handler: F) -> Option<Handler>
    where
        F: Fn(&Step, &mut EmitContext<'_>) -> EmitResult<Vec<Line>> + Send + Sync + 'static,
    {
        self.register_handler(tag, Arc::new(handler))
    }

    /// Bind `tag` to an already shared handler.
    pub fn register_handler(&mut self, tag: impl Into<String>, handler: Handler) -> Option<Handler> {
        let tag = tag.into();
        let previous = self.handlers.insert(tag.clone(), handler);
        if previous.is_some() {
            tracing::debug!(tag = %tag, "overriding construct handler");
        }
        previous
    }

    /// Look up the handler for `tag`.
    pub fn resolve(&self, tag: &str) -> EmitResult<&Handler> {
        self.handlers.get(tag).ok_or_else(|| EmitError::unknown(tag))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// ============================================================================
// Process-wide registry
// ============================================================================

static GLOBAL: OnceLock<RwLock<HandlerRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<HandlerRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(HandlerRegistry::with_builtins()))
}

/// Bind `tag` in the process-wide registry, returning the handler it replaces.
pub fn register<F>(tag: impl Into<String>, handler: F) -> Option<Handler>
where
    F: Fn(&Step, &mut EmitContext<'_>) -> EmitResult<Vec<Line>> + Send + Sync + 'static,
{
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(tag, handler)
}

/// Run `f` with the process-wide registry read-locked.
pub(crate) fn with_global<R>(f: impl FnOnce(&HandlerRegistry) -> R) -> R {
    let guard = global().read().unwrap_or_else(PoisonError::into_inner);
    f(&guard)
}

/// Copy of the process-wide registry (for tooling such as listing tags).
pub fn global_snapshot() -> HandlerRegistry {
    with_global(HandlerRegistry::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EmitErrorKind;

    fn noop(_: &Step, _: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
        Ok(Vec::new())
    }

    #[test]
    fn test_new_is_empty() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("pass"));
    }

    #[test]
    fn test_builtins_cover_construct_table() {
        let registry = HandlerRegistry::with_builtins();
        for info in pystep_syntax::tags::CONSTRUCTS {
            assert!(registry.contains(info.canonical), "missing handler for {}", info.canonical);
        }
        assert_eq!(registry.len(), pystep_syntax::tags::CONSTRUCTS.len());
    }

    #[test]
    fn test_register_returns_previous() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register("x", noop).is_none());
        assert!(registry.register("x", noop).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_names_tag() {
        let registry = HandlerRegistry::with_builtins();
        let err = registry.resolve("unsupported_construct").err().unwrap();
        assert_eq!(
            err.kind,
            EmitErrorKind::UnknownConstruct {
                tag: "unsupported_construct".into()
            }
        );
    }

    #[test]
    fn test_tags_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register("b", noop);
        registry.register("a", noop);
        assert_eq!(registry.tags(), ["a", "b"]);
        assert!(format!("{:?}", registry).contains("\"a\""));
    }
}
