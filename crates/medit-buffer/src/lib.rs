//! # Medit Buffer
//!
//! The in-memory line buffer behind a medit editing session.
//!
//! ## Key Concepts
//!
//! ### Ownership
//! - `Buffer` owns its `Line`s exclusively; callers only ever borrow them
//! - Line positions can only be changed by the owning `Buffer`
//! - The storage backend is owned by the buffer, so a buffer always knows
//!   how to reach its backing file
//!
//! ### Storage as a Capability
//! - All file access goes through the [`Storage`] trait
//! - [`FsStorage`] talks to the real filesystem
//! - [`MemoryStorage`] keeps "files" in a map, which keeps tests hermetic

mod buffer;
mod line;
mod storage;

pub use buffer::{Buffer, LoadOutcome};
pub use line::Line;
pub use storage::{FsStorage, MemoryStorage, Storage, split_lines};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Buffer is not bound to a file")]
    NoPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
