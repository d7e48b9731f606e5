//! Output lines and final rendering
//!
//! Handlers return [`Line`]s tagged with their nesting depth; indentation text is only produced
//! when the emitter joins them, so the indent unit is a pure rendering choice.

use crate::config::EmitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Indented source line
    Code,
    /// Empty line, never indented
    Blank,
    /// Emitted as-is at column 0 (shebang, encoding declarations)
    Verbatim,
}

/// One physical output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub depth: usize,
    pub kind: LineKind,
    pub text: String,
}

impl Line {
    pub fn code(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            kind: LineKind::Code,
            text: text.into(),
        }
    }

    pub fn blank() -> Self {
        Self {
            depth: 0,
            kind: LineKind::Blank,
            text: String::new(),
        }
    }

    pub fn verbatim(text: impl Into<String>) -> Self {
        Self {
            depth: 0,
            kind: LineKind::Verbatim,
            text: text.into(),
        }
    }

    /// Render with the configured indent unit, without a terminator.
    pub fn render(&self, config: &EmitConfig) -> String {
        match self.kind {
            LineKind::Code if self.text.is_empty() => String::new(),
            LineKind::Code => format!("{}{}", config.indent.render(self.depth), self.text),
            LineKind::Blank => String::new(),
            LineKind::Verbatim => self.text.clone(),
        }
    }
}

/// Join rendered lines with the configured terminator.
pub fn render_lines(lines: &[Line], config: &EmitConfig) -> String {
    let terminator = config.line_ending.as_str();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(terminator);
        }
        out.push_str(&line.render(config));
    }
    if config.trailing_newline && !lines.is_empty() {
        out.push_str(terminator);
    }
    out
}
