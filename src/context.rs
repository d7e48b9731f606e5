//! Per-call emission context
//!
//! An [`EmitContext`] carries the current indentation depth, the breadcrumb of the step being
//! rendered, and borrowed references to the registry and configuration. One context is created
//! per `generate` call and dropped at its end; depth is never global state.
//!
//! ## Notes
//! - [`EmitContext::indented`] returns a guard: depth is restored when the guard drops, including
//!   on early `?` returns and panics.
//! - Handlers build lines with [`EmitContext::line`], which stamps the current depth.

use std::ops::{Deref, DerefMut};

use pystep_syntax::{DecodeError, Step, StepPath};

use crate::config::{EmitConfig, EmptyBodyPolicy};
use crate::dispatch;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;
use crate::registry::HandlerRegistry;

pub struct EmitContext<'r> {
    registry: &'r HandlerRegistry,
    config: &'r EmitConfig,
    depth: usize,
    path: StepPath,
}

impl<'r> EmitContext<'r> {
    pub fn new(registry: &'r HandlerRegistry, config: &'r EmitConfig) -> Self {
        Self {
            registry,
            config,
            depth: 0,
            path: StepPath::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn config(&self) -> &'r EmitConfig {
        self.config
    }

    pub fn registry(&self) -> &'r HandlerRegistry {
        self.registry
    }

    /// Breadcrumb of the step currently being rendered.
    pub fn path(&self) -> &StepPath {
        &self.path
    }

    /// Enter one nesting level until the returned guard drops.
    pub fn indented(&mut self) -> Indented<'_, 'r> {
        self.depth += 1;
        Indented { ctx: self }
    }

    /// Code line at the current depth.
    pub fn line(&self, text: impl Into<String>) -> Line {
        Line::code(self.depth, text)
    }

    pub fn blank(&self) -> Line {
        Line::blank()
    }

    /// Line emitted as-is at column 0.
    pub fn verbatim(&self, text: impl Into<String>) -> Line {
        Line::verbatim(text)
    }

    /// Render `step` at the current depth.
    pub fn dispatch(&mut self, step: &Step) -> EmitResult<Vec<Line>> {
        dispatch::dispatch(step, self)
    }

    /// Render `step` found at `attribute[index]` of the current step, at the current depth.
    pub fn dispatch_child(&mut self, attribute: &str, index: usize, step: &Step) -> EmitResult<Vec<Line>> {
        self.path.push(attribute, index, Some(step.tag()));
        let result = dispatch::dispatch(step, self).map_err(|e| e.or_path(&self.path));
        self.path.pop();
        result
    }

    /// Render every step of `steps` in order, at the current depth.
    pub fn dispatch_all(&mut self, attribute: &str, steps: &[Step]) -> EmitResult<Vec<Line>> {
        let mut lines = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            lines.extend(self.dispatch_child(attribute, index, step)?);
        }
        Ok(lines)
    }

    /// Render the suite `attribute` of a `tag` block one level deeper.
    ///
    /// An empty suite becomes a single `pass`, or an `EmptyBody` error under
    /// [`EmptyBodyPolicy::Reject`].
    pub fn body(&mut self, tag: &str, attribute: &str, steps: &[Step]) -> EmitResult<Vec<Line>> {
        let mut scope = self.indented();
        if steps.is_empty() {
            return match scope.config.empty_body {
                EmptyBodyPolicy::InsertPass => Ok(vec![scope.line("pass")]),
                EmptyBodyPolicy::Reject => Err(EmitError::empty_body(tag, attribute).or_path(&scope.path)),
            };
        }
        scope.dispatch_all(attribute, steps)
    }

    /// Convert a decoding failure of the current step's attributes, rooting its path here.
    pub fn decode_error(&self, err: DecodeError) -> EmitError {
        let mut path = self.path.clone();
        for segment in err.path.segments() {
            path.push(segment.attribute.clone(), segment.index, segment.tag.as_deref());
        }
        EmitError {
            kind: err.kind.into(),
            path,
        }
    }
}

/// Scope guard returned by [`EmitContext::indented`].
pub struct Indented<'a, 'r> {
    ctx: &'a mut EmitContext<'r>,
}

impl<'r> Deref for Indented<'_, 'r> {
    type Target = EmitContext<'r>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for Indented<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for Indented<'_, '_> {
    fn drop(&mut self) {
        self.ctx.depth -= 1;
    }
}
