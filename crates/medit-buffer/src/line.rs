//! A single line of text.
//!
//! ## Position is Derived
//!
//! Every line knows its 1-based position in the owning [`Buffer`](crate::Buffer),
//! but only the buffer can change it. Outside this crate the position is
//! strictly read-only, so it can never drift away from the line's index.

use std::fmt;

/// A line of text together with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    position: usize,
}

impl Line {
    /// Creates a detached line. The position is fixed up when the line
    /// joins a buffer.
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: 0,
        }
    }

    /// Returns the text of the line, without any line terminator.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the 1-based position of the line within its buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Replaces the text, returning the previous content.
    pub(crate) fn set_text(&mut self, text: impl Into<String>) -> String {
        std::mem::replace(&mut self.text, text.into())
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.text)
    }
}
