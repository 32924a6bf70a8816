//! # medit - A Non-interactive Line Editor
//!
//! Edit text files one short command at a time.
//!
//! ## Quick Start
//!
//! ```bash
//! # Edit a file (created if missing)
//! cargo run -- notes.txt
//!
//! # Scratch buffer with no file behind it
//! cargo run
//!
//! # Louder console logging
//! cargo run -- -vv notes.txt
//! ```

mod logging;
mod terminal;

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};

use medit_buffer::FsStorage;
use medit_core::config::EditorConfig;
use medit_core::{Config, Session, TracingDiagnostics};

use crate::terminal::TerminalConsole;

/// medit - a non-interactive text editor for the terminal
#[derive(Parser, Debug)]
#[command(name = "medit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to edit (omit for an in-memory buffer)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Config file to use instead of the default one
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log file to write instead of the platform default
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Verbose console logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Loads the configuration.
///
/// An explicit `--config` must load. Problems with the default file only
/// produce a warning, returned so it can be logged once logging is up.
fn load_config(path: Option<&Path>) -> anyhow::Result<(Config, Option<String>)> {
    if let Some(path) = path {
        let config = Config::load_from(path)
            .with_context(|| format!("Cannot load config {}", path.display()))?;
        return Ok((config, None));
    }

    match Config::load_from_default_path() {
        Ok(config) => Ok((config, None)),
        Err(err) => Ok((
            Config::default(),
            Some(format!("Ignoring default config: {err}")),
        )),
    }
}

/// Turns off the coloured cursor line when stdout is not a terminal.
fn interactive_config(mut config: EditorConfig, interactive: bool) -> EditorConfig {
    if !interactive {
        config.highlight_cursor_line = false;
    }
    config
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let (config, config_warning) = load_config(args.config.as_deref())?;

    // Initialize logging
    let log_path = args
        .log_file
        .clone()
        .or_else(|| config.log.file.clone())
        .unwrap_or_else(logging::default_log_path);
    logging::init(&log_path, &config.log, args.verbose)?;

    tracing::debug!("Starting medit v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Logging to {}", log_path.display());
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}");
    }

    let console = TerminalConsole::new();
    let editor = interactive_config(config.editor, console.is_interactive());
    let mut session = Session::open(
        args.file.as_deref(),
        FsStorage,
        console,
        TracingDiagnostics,
        editor,
    )?;

    // Storage failures end up here and exit non-zero
    session.run().context("Editing session failed")?;

    Ok(())
}
