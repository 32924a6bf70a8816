//! Line buffer implementation.
//!
//! ## Why a `Vec<Line>`?
//!
//! medit edits whole lines at a time and the files it targets are small, so
//! a plain vector of lines beats anything fancier:
//! - **Indexing**: the cursor is a line index, O(1) lookup
//! - **Windowing**: the visible context is just a slice, no copying
//! - **Renumbering**: one linear pass after a structural edit
//!
//! ## Learning: Generic Parameters with Defaults
//!
//! ```rust,ignore
//! let buffer: Buffer = Buffer::load("notes.txt", FsStorage)?;   // Buffer<FsStorage>
//! let scratch = Buffer::new(MemoryStorage::new());               // Buffer<MemoryStorage>
//! ```
//!
//! The storage backend is a type parameter, so the real filesystem and the
//! in-memory one compile to direct calls with no trait objects involved.

use std::path::{Path, PathBuf};

use crate::line::Line;
use crate::storage::{FsStorage, Storage};
use crate::{BufferError, BufferResult};

/// How [`Buffer::open`] obtained its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file existed and was read.
    Opened,
    /// The file was missing, so an empty one was created.
    Created,
}

/// An ordered sequence of lines, optionally bound to a backing file.
///
/// # Invariant
///
/// `lines[i].position() == i + 1` for every line. Every structural edit
/// made through this type restores it before returning.
#[derive(Debug, Clone)]
pub struct Buffer<S: Storage = FsStorage> {
    /// Backing file (None for in-memory buffers)
    path: Option<PathBuf>,

    /// The lines, in order
    lines: Vec<Line>,

    /// Where `save` and `is_dirty` go
    storage: S,
}

impl<S: Storage> Buffer<S> {
    /// Creates an empty buffer that is not bound to any file.
    ///
    /// # Example
    /// ```
    /// use medit_buffer::{Buffer, MemoryStorage};
    ///
    /// let buffer = Buffer::new(MemoryStorage::new());
    /// assert!(buffer.is_empty());
    /// assert!(buffer.path().is_none());
    /// ```
    pub fn new(storage: S) -> Self {
        Self {
            path: None,
            lines: Vec::new(),
            storage,
        }
    }

    /// Creates an unbound buffer holding the given lines.
    pub fn from_lines<I, T>(lines: I, storage: S) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut buffer = Self {
            path: None,
            lines: lines.into_iter().map(Line::new).collect(),
            storage,
        };
        buffer.renumber();
        buffer
    }

    /// Loads a buffer from `path`, creating an empty file if it is missing.
    pub fn load(path: impl AsRef<Path>, storage: S) -> BufferResult<Self> {
        Self::open(path, storage).map(|(buffer, _)| buffer)
    }

    /// Like [`Buffer::load`], but also reports whether the file was created.
    ///
    /// A missing file is not an error: it becomes an empty buffer bound to
    /// a freshly created empty file.
    pub fn open(path: impl AsRef<Path>, storage: S) -> BufferResult<(Self, LoadOutcome)> {
        let path = path.as_ref();

        let (texts, outcome) = if storage.exists(path) {
            (storage.read_all(path)?, LoadOutcome::Opened)
        } else {
            storage.create_empty(path)?;
            (Vec::new(), LoadOutcome::Created)
        };

        let mut buffer = Self::from_lines(texts, storage);
        buffer.path = Some(path.to_path_buf());
        Ok((buffer, outcome))
    }

    // ==================== Access ====================

    /// Returns the backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the number of lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the buffer holds no lines at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the line at a 0-based index.
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Returns all lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Returns the text of every line, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(Line::text).collect()
    }

    // ==================== Mutations ====================

    /// Inserts a new line so that it ends up at `index`.
    ///
    /// An index past the end appends. Returns the index actually used.
    pub fn insert(&mut self, index: usize, text: impl Into<String>) -> usize {
        let index = index.min(self.lines.len());
        self.lines.insert(index, Line::new(text));
        self.renumber();
        index
    }

    /// Removes and returns the line at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Line> {
        if index >= self.lines.len() {
            return None;
        }
        let line = self.lines.remove(index);
        self.renumber();
        Some(line)
    }

    /// Replaces the text of the line at `index`, returning the old text.
    ///
    /// Positions are untouched: this is not a structural edit.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Option<String> {
        self.lines.get_mut(index).map(|line| line.set_text(text))
    }

    /// Recomputes every line's position from its index.
    ///
    /// Idempotent, and never touches line text.
    pub fn renumber(&mut self) {
        for (i, line) in self.lines.iter_mut().enumerate() {
            line.set_position(i + 1);
        }
    }

    // ==================== Views ====================

    /// Returns the lines within `context` of `center`, inclusive.
    ///
    /// The slice runs from `center - context` to `center + context`, clipped
    /// to the buffer. It shrinks near either edge and is empty only when the
    /// buffer is. A `center` past the end is treated as the last line.
    pub fn window(&self, center: usize, context: usize) -> &[Line] {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return &[];
        };
        let center = center.min(last);
        let start = center.saturating_sub(context);
        let end = center.saturating_add(context).min(last);
        &self.lines[start..=end]
    }

    // ==================== Persistence ====================

    /// Writes every line to the backing file, overwriting it.
    pub fn save(&self) -> BufferResult<()> {
        let path = self.path.as_deref().ok_or(BufferError::NoPath)?;
        self.storage.write_all(path, &self.texts())?;
        Ok(())
    }

    /// Returns true if the in-memory text differs from the backing file.
    ///
    /// The file is re-read on every call. A missing file, or no file at
    /// all, counts as an empty sequence of lines.
    pub fn is_dirty(&self) -> BufferResult<bool> {
        let on_disk = match self.path.as_deref() {
            Some(path) if self.storage.exists(path) => self.storage.read_all(path)?,
            _ => Vec::new(),
        };

        Ok(on_disk.len() != self.lines.len()
            || on_disk
                .iter()
                .zip(&self.lines)
                .any(|(disk, line)| disk != line.text()))
    }
}
