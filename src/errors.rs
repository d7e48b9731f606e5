//! Emission errors
//!
//! Every failure aborts the whole `generate` call; no partial output is returned. Errors carry
//! the breadcrumb of the step that failed.

use pystep_syntax::{DecodeError, DecodeErrorKind, StepPath};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitErrorKind {
    /// No handler is registered for the step's tag.
    #[error("unknown construct `{tag}`: no handler registered")]
    UnknownConstruct { tag: String },

    /// A required attribute is missing or empty.
    #[error("malformed `{tag}` step: attribute `{attribute}` {reason}")]
    MalformedStep {
        tag: String,
        attribute: String,
        reason: String,
    },

    /// An attribute has the wrong shape.
    #[error("type mismatch in `{tag}` step: attribute `{attribute}` must be {expected}")]
    TypeMismatch {
        tag: String,
        attribute: String,
        expected: String,
    },

    /// A block body is empty and the empty-body policy rejects it.
    #[error("empty `{attribute}` in `{tag}` step")]
    EmptyBody { tag: String, attribute: String },
}

/// Emission failure with the location of the offending step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at {path})")]
pub struct EmitError {
    pub kind: EmitErrorKind,
    pub path: StepPath,
}

pub type EmitResult<T> = Result<T, EmitError>;

impl EmitError {
    pub fn new(kind: EmitErrorKind) -> Self {
        Self {
            kind,
            path: StepPath::new(),
        }
    }

    pub fn unknown(tag: &str) -> Self {
        Self::new(EmitErrorKind::UnknownConstruct { tag: tag.to_string() })
    }

    pub fn malformed(tag: &str, attribute: &str, reason: impl Into<String>) -> Self {
        Self::new(EmitErrorKind::MalformedStep {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
            reason: reason.into(),
        })
    }

    pub fn mismatch(tag: &str, attribute: &str, expected: impl Into<String>) -> Self {
        Self::new(EmitErrorKind::TypeMismatch {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
            expected: expected.into(),
        })
    }

    pub fn empty_body(tag: &str, attribute: &str) -> Self {
        Self::new(EmitErrorKind::EmptyBody {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        })
    }

    /// Attach `path` unless a deeper step already recorded its own.
    pub fn or_path(mut self, path: &StepPath) -> Self {
        if self.path.is_empty() {
            self.path = path.clone();
        }
        self
    }

    /// Tag of the failing step as reported by the error kind.
    pub fn tag(&self) -> &str {
        match &self.kind {
            EmitErrorKind::UnknownConstruct { tag }
            | EmitErrorKind::MalformedStep { tag, .. }
            | EmitErrorKind::TypeMismatch { tag, .. }
            | EmitErrorKind::EmptyBody { tag, .. } => tag,
        }
    }
}

impl From<DecodeErrorKind> for EmitErrorKind {
    fn from(kind: DecodeErrorKind) -> Self {
        match kind {
            DecodeErrorKind::MalformedStep { tag, attribute, reason } => {
                EmitErrorKind::MalformedStep { tag, attribute, reason }
            }
            DecodeErrorKind::TypeMismatch { tag, attribute, expected } => {
                EmitErrorKind::TypeMismatch { tag, attribute, expected }
            }
        }
    }
}

impl From<DecodeError> for EmitError {
    fn from(err: DecodeError) -> Self {
        Self {
            kind: err.kind.into(),
            path: err.path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_tag_and_path() {
        let mut path = StepPath::new();
        path.push("steps", 0, Some("func_def"));
        let err = EmitError::unknown("unsupported_construct").or_path(&path);
        assert_eq!(
            err.to_string(),
            "unknown construct `unsupported_construct`: no handler registered (at steps[0] (func_def))"
        );
    }

    #[test]
    fn test_or_path_keeps_innermost() {
        let mut inner = StepPath::new();
        inner.push("steps", 0, Some("if"));
        inner.push("body", 1, Some("return"));
        let mut outer = StepPath::new();
        outer.push("steps", 0, Some("if"));

        let err = EmitError::malformed("return", "value", "must not be empty")
            .or_path(&inner)
            .or_path(&outer);
        assert_eq!(err.path, inner);
    }

    #[test]
    fn test_decode_error_converts_kind() {
        let err: EmitError = DecodeError::mismatch("while", "body", "a list of steps").into();
        assert_eq!(
            err.kind,
            EmitErrorKind::TypeMismatch {
                tag: "while".into(),
                attribute: "body".into(),
                expected: "a list of steps".into(),
            }
        );
        assert_eq!(err.tag(), "while");
    }
}
