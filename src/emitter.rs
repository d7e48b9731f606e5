//! Emitter facade: step sequence in, Python source text out.
//!
//! ## Examples
//! ```rust
//! use pystep::{Emitter, Step};
//!
//! let program = vec![Step::def("add", &["a", "b"], vec![Step::ret("a + b")])];
//! let source = Emitter::new().generate(&program).unwrap();
//! assert_eq!(source, "def add(a, b):\n    return a + b");
//! ```

use std::sync::Arc;

use pystep_syntax::{decode_program, Step};
use serde_json::Value;

use crate::config::EmitConfig;
use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::{render_lines, Line};
use crate::registry::{self, HandlerRegistry};

/// Generates Python source from step trees.
///
/// By default the process-wide registry is used; [`Emitter::with_registry`] pins a private one
/// (handy for tests and for callers that override built-in constructs locally).
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    registry: Option<Arc<HandlerRegistry>>,
    config: EmitConfig,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_config(mut self, config: EmitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EmitConfig {
        &self.config
    }

    /// Render `steps` in order, starting at depth 0.
    ///
    /// The first failing step aborts the call; no partial output is returned.
    #[tracing::instrument(skip_all, fields(step_count = steps.len()))]
    pub fn generate(&self, steps: &[Step]) -> EmitResult<String> {
        let lines = match &self.registry {
            Some(registry) => self.lines_with(registry, steps)?,
            None => registry::with_global(|registry| self.lines_with(registry, steps))?,
        };
        tracing::debug!(line_count = lines.len(), "generated source");
        Ok(render_lines(&lines, &self.config))
    }

    /// Decode a JSON step document (array of steps or a single step object) and render it.
    #[tracing::instrument(skip_all)]
    pub fn generate_json(&self, doc: &Value) -> EmitResult<String> {
        let program = decode_program(doc).map_err(EmitError::from)?;
        self.generate(&program)
    }

    /// Parse and render a JSON step document given as text.
    pub fn generate_str(&self, json: &str) -> EmitResult<String> {
        let doc: Value = serde_json::from_str(json).map_err(|e| {
            EmitError::mismatch(pystep_syntax::errors::PROGRAM, "steps", format!("valid JSON ({})", e))
        })?;
        self.generate_json(&doc)
    }

    fn lines_with(&self, registry: &HandlerRegistry, steps: &[Step]) -> EmitResult<Vec<Line>> {
        let mut ctx = EmitContext::new(registry, &self.config);
        ctx.dispatch_all("steps", steps)
    }
}

/// Render `steps` with the process-wide registry and default configuration.
pub fn generate(steps: &[Step]) -> EmitResult<String> {
    Emitter::new().generate(steps)
}
