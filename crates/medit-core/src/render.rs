//! Viewport rendering.
//!
//! Turns a buffer and a cursor into the block of text shown above the
//! prompt. Positions are integers everywhere else and only become text here.

use crossterm::style::Stylize;
use medit_buffer::{Buffer, Line, Storage};

/// Prefix for the cursor line.
pub const CURSOR_MARKER: &str = "> ";

/// Prefix for every other line.
pub const PLAIN_MARKER: &str = "  ";

/// Rows reserved for the prompt and its surroundings.
const RESERVED_ROWS: usize = 3;

/// Computes how many lines to show on each side of the cursor.
///
/// Half of the usable terminal height, but never less than `min_context`.
/// An unknown height yields `min_context`.
pub fn context_size(rows: Option<u16>, min_context: usize) -> usize {
    rows.map(|rows| usize::from(rows).saturating_sub(RESERVED_ROWS) / 2)
        .unwrap_or(0)
        .max(min_context)
}

/// Formats one line of the viewport.
pub fn render_line(line: &Line, is_cursor: bool, highlight: bool) -> String {
    if !is_cursor {
        return format!("{PLAIN_MARKER}{line}");
    }

    let text = format!("{CURSOR_MARKER}{line}");
    if highlight {
        text.green().to_string()
    } else {
        text
    }
}

/// Renders the context window around `cursor`.
///
/// Returns one entry per visible line. Exactly the line at `cursor` gets
/// the cursor marker. A `None` cursor (empty buffer) renders nothing.
pub fn render<S: Storage>(
    buffer: &Buffer<S>,
    cursor: Option<usize>,
    context: usize,
    highlight: bool,
) -> Vec<String> {
    let Some(cursor) = cursor else {
        return Vec::new();
    };

    buffer
        .window(cursor, context)
        .iter()
        .map(|line| render_line(line, line.position() == cursor + 1, highlight))
        .collect()
}
