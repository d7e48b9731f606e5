//! Emission configuration
//!
//! Controls the indentation unit, line terminator, empty-suite policy and trailing newline.

/// Widest space indent accepted per nesting level.
pub const MAX_INDENT_WIDTH: usize = 16;

/// Indentation unit repeated once per nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// `n` spaces per level, clamped to `1..=MAX_INDENT_WIDTH` when rendered
    Spaces(usize),
    /// One tab per level
    Tabs,
}

impl Indent {
    /// Characters in one nesting level; never zero.
    pub fn width(self) -> usize {
        match self {
            Indent::Spaces(n) => n.clamp(1, MAX_INDENT_WIDTH),
            Indent::Tabs => 1,
        }
    }

    /// Text for `depth` nesting levels.
    pub fn render(self, depth: usize) -> String {
        match self {
            Indent::Spaces(_) => " ".repeat(self.width() * depth),
            Indent::Tabs => "\t".repeat(depth),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(4)
    }
}

/// Line terminator used when joining lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// What to do with a block whose body is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyBodyPolicy {
    /// Emit a single `pass` at the body depth
    #[default]
    InsertPass,
    /// Fail with [`crate::EmitErrorKind::EmptyBody`]
    Reject,
}

/// Emission configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitConfig {
    /// Indentation unit per nesting level
    pub indent: Indent,
    /// Line terminator
    pub line_ending: LineEnding,
    /// Empty block body handling
    pub empty_body: EmptyBodyPolicy,
    /// Whether the output ends with a line terminator
    pub trailing_newline: bool,
}

impl EmitConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent with `width` spaces per level, clamped to `1..=MAX_INDENT_WIDTH`
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = Indent::Spaces(width.clamp(1, MAX_INDENT_WIDTH));
        self
    }

    /// Set the indentation unit
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    /// Set the line terminator
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the empty-body policy
    pub fn with_empty_body(mut self, policy: EmptyBodyPolicy) -> Self {
        self.empty_body = policy;
        self
    }

    /// Terminate the last line too
    pub fn with_trailing_newline(mut self, trailing: bool) -> Self {
        self.trailing_newline = trailing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Default config tests
    // ========================================

    #[test]
    fn test_default_config() {
        let config = EmitConfig::default();
        assert_eq!(config.indent, Indent::Spaces(4));
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.empty_body, EmptyBodyPolicy::InsertPass);
        assert!(!config.trailing_newline);
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(EmitConfig::new(), EmitConfig::default());
    }

    // ========================================
    // Builder method tests
    // ========================================

    #[test]
    fn test_with_indent_width() {
        let config = EmitConfig::new().with_indent_width(2);
        assert_eq!(config.indent, Indent::Spaces(2));
        assert_eq!(config.line_ending, LineEnding::Lf);
    }

    #[test]
    fn test_builder_chain_all() {
        let config = EmitConfig::new()
            .with_indent(Indent::Tabs)
            .with_line_ending(LineEnding::CrLf)
            .with_empty_body(EmptyBodyPolicy::Reject)
            .with_trailing_newline(true);

        assert_eq!(config.indent, Indent::Tabs);
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert_eq!(config.empty_body, EmptyBodyPolicy::Reject);
        assert!(config.trailing_newline);
    }

    #[test]
    fn test_with_indent_width_never_zero() {
        assert_eq!(EmitConfig::new().with_indent_width(0).indent, Indent::Spaces(1));
        assert_eq!(
            EmitConfig::new().with_indent_width(usize::MAX).indent,
            Indent::Spaces(MAX_INDENT_WIDTH)
        );
    }

    #[test]
    fn test_builder_override() {
        let config = EmitConfig::new().with_indent_width(2).with_indent_width(8);
        assert_eq!(config.indent, Indent::Spaces(8)); // Last value wins
    }

    // ========================================
    // Indent rendering tests
    // ========================================

    #[test]
    fn test_indent_render_spaces() {
        assert_eq!(Indent::Spaces(4).render(0), "");
        assert_eq!(Indent::Spaces(4).render(2), "        ");
        assert_eq!(Indent::Spaces(2).render(3), "      ");
    }

    #[test]
    fn test_indent_render_clamps_width() {
        assert_eq!(Indent::Spaces(0).render(2), "  ");
        assert_eq!(Indent::Spaces(usize::MAX).render(1), " ".repeat(MAX_INDENT_WIDTH));
    }

    #[test]
    fn test_indent_render_tabs() {
        assert_eq!(Indent::Tabs.render(3), "\t\t\t");
    }

    #[test]
    fn test_line_ending_as_str() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
    }
}
