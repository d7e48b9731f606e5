//! Errors raised while decoding step documents.

use thiserror::Error;

use crate::path::StepPath;

/// Placeholder tag for objects whose `type` could not be read.
pub const UNTAGGED: &str = "<untagged>";

/// Placeholder tag for the document root.
pub const PROGRAM: &str = "<program>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// A required attribute is missing, empty or otherwise unusable.
    #[error("malformed `{tag}` step: attribute `{attribute}` {reason}")]
    MalformedStep {
        tag: String,
        attribute: String,
        reason: String,
    },

    /// An attribute has the wrong JSON shape.
    #[error("type mismatch in `{tag}` step: attribute `{attribute}` must be {expected}")]
    TypeMismatch {
        tag: String,
        attribute: String,
        expected: String,
    },
}

/// Decoding failure with the location of the offending step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at {path})")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub path: StepPath,
}

impl DecodeError {
    pub fn malformed(tag: &str, attribute: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: DecodeErrorKind::MalformedStep {
                tag: tag.to_string(),
                attribute: attribute.to_string(),
                reason: reason.into(),
            },
            path: StepPath::new(),
        }
    }

    pub fn mismatch(tag: &str, attribute: &str, expected: impl Into<String>) -> Self {
        Self {
            kind: DecodeErrorKind::TypeMismatch {
                tag: tag.to_string(),
                attribute: attribute.to_string(),
                expected: expected.into(),
            },
            path: StepPath::new(),
        }
    }

    /// Attach `path` unless a deeper step already recorded its own.
    pub fn or_path(mut self, path: &StepPath) -> Self {
        if self.path.is_empty() {
            self.path = path.clone();
        }
        self
    }
}
