//! Breadcrumbs locating a step inside a step tree.
//!
//! A [`StepPath`] is the chain of `attribute[index] (tag)` segments from the program root
//! to one step, e.g. `steps[0] (func_def) > body[2] (if) > else[0] (return)`.

use std::fmt;

/// One hop from a parent to a child step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Attribute holding the child list (`steps` at the top level).
    pub attribute: String,
    /// Sibling index inside that list.
    pub index: usize,
    /// Tag of the child, once known.
    pub tag: Option<String>,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.attribute, self.index)?;
        if let Some(tag) = &self.tag {
            write!(f, " ({})", tag)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPath(Vec<PathSegment>);

impl StepPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attribute: impl Into<String>, index: usize, tag: Option<&str>) {
        self.0.push(PathSegment {
            attribute: attribute.into(),
            index,
            tag: tag.map(str::to_string),
        });
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Record the tag of the innermost segment once it has been read.
    pub fn set_tag(&mut self, tag: &str) {
        if let Some(last) = self.0.last_mut() {
            last.tag = Some(tag.to_string());
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags from the root to the innermost step.
    pub fn tags(&self) -> Vec<&str> {
        self.0.iter().filter_map(|s| s.tag.as_deref()).collect()
    }
}

impl fmt::Display for StepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_displays_root() {
        assert_eq!(StepPath::new().to_string(), "<root>");
    }

    #[test]
    fn test_display_chains_segments() {
        let mut path = StepPath::new();
        path.push("steps", 0, Some("func_def"));
        path.push("body", 2, None);
        path.set_tag("if");
        assert_eq!(path.to_string(), "steps[0] (func_def) > body[2] (if)");
        assert_eq!(path.tags(), ["func_def", "if"]);
    }

    #[test]
    fn test_pop_restores_parent() {
        let mut path = StepPath::new();
        path.push("steps", 1, Some("while"));
        path.push("body", 0, Some("break"));
        let popped = path.pop().unwrap();
        assert_eq!(popped.index, 0);
        assert_eq!(path.len(), 1);
        assert_eq!(path.to_string(), "steps[1] (while)");
    }
}
