//! Storage backends for buffers.
//!
//! This module provides a small trait for the handful of file operations a
//! buffer needs, so the editing core never calls `std::fs` directly:
//! - `FsStorage`: native filesystem using `std::fs`
//! - `MemoryStorage`: in-memory map of paths to file contents, for tests
//!
//! The trait is synchronous. Files are never held open between calls.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File operations consumed by [`Buffer`](crate::Buffer).
pub trait Storage {
    /// Returns true if something exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the file at `path` as a sequence of lines.
    ///
    /// Fails if the file is missing or unreadable. Callers that treat a
    /// missing file as empty must check [`Storage::exists`] first.
    fn read_all(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Overwrites the file at `path`, writing each line followed by `\n`.
    fn write_all(&self, path: &Path, lines: &[&str]) -> io::Result<()>;

    /// Creates an empty file at `path`.
    fn create_empty(&self, path: &Path) -> io::Result<()>;
}

/// Splits text into lines using universal newline rules.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line. A terminator at the
/// very end of the text does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(['\n', '\r']) {
            Some(idx) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }

    lines
}

/// Joins lines into file content, terminating every line with `\n`.
fn join_lines(lines: &[&str]) -> String {
    let capacity = lines.iter().map(|l| l.len() + 1).sum();
    let mut content = String::with_capacity(capacity);
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// Native filesystem storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<String>> {
        let content = std::fs::read_to_string(path)?;
        Ok(split_lines(&content))
    }

    fn write_all(&self, path: &Path, lines: &[&str]) -> io::Result<()> {
        // One write call: either the whole content lands or we report failure
        std::fs::write(path, join_lines(lines))
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        std::fs::File::create(path)?;
        Ok(())
    }
}

/// In-memory storage.
///
/// Clones share the same underlying files, so a test can keep one handle
/// while a buffer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Rc<RefCell<HashMap<PathBuf, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file with raw content.
    pub fn insert_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), content.into());
    }

    /// Returns the raw content of a file, if present.
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Makes every subsequent write fail with `PermissionDenied`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<String>> {
        self.files
            .borrow()
            .get(path)
            .map(|content| split_lines(content))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })
    }

    fn write_all(&self, path: &Path, lines: &[&str]) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        self.insert_file(path, join_lines(lines));
        Ok(())
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        self.write_all(path, &[])
    }
}
