//! # Medit Core
//!
//! The editing session state machine and everything it needs.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Session                            │
//! │  ┌───────────┐  ┌───────────┐  ┌──────────┐  ┌──────────┐ │
//! │  │  Command  │  │  Renderer │  │  Config  │  │  Cursor  │ │
//! │  │  parser   │  │           │  │          │  │          │ │
//! │  └───────────┘  └───────────┘  └──────────┘  └──────────┘ │
//! │         │                                                 │
//! │  ┌──────┴────────────────────────────────┐                │
//! │  │         Buffer (medit-buffer)         │                │
//! │  └───────────────────────────────────────┘                │
//! └──────────────────────────────────────────────────────────┘
//!        ▲                  ▲                      ▲
//!     Console          Diagnostics              Storage
//!   (prompts, clear)   (leveled log sink)      (file access)
//! ```
//!
//! ## Learning: Capabilities as Traits
//!
//! The session never touches the terminal, the log destination or the
//! filesystem directly. Each one is a trait handed in at construction, so
//! the whole state machine runs unchanged against scripted input in tests.

pub mod command;
pub mod config;
pub mod console;
pub mod diagnostics;
pub mod render;
pub mod session;

pub use command::{Command, Step};
pub use config::Config;
pub use console::{Console, ScriptedConsole};
pub use diagnostics::{Diagnostics, Level, RecordingDiagnostics, TracingDiagnostics};
pub use render::{context_size, render};
pub use session::{Session, SessionState};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] medit_buffer::BufferError),
}
