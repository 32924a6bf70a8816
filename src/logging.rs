//! Log sink setup.
//!
//! Everything goes to a log file; info and above is also echoed to the
//! console. The file lives in the platform's usual place for logs unless
//! overridden on the command line or in the config file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use medit_core::config::LogConfig;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const APP_DIR: &str = "medit";
const LOG_FILE: &str = "medit.log";

/// Returns where the log file goes when nothing overrides it.
///
/// - Linux: `~/.local/share/medit/medit.log`
/// - macOS: `~/Library/Logs/medit/medit.log`
/// - Windows: `%APPDATA%\medit\medit.log`
/// - elsewhere: `~/medit.log`
pub fn default_log_path() -> PathBuf {
    match platform_log_dir() {
        Some(dir) => dir.join(APP_DIR).join(LOG_FILE),
        None => dirs::home_dir().unwrap_or_default().join(LOG_FILE),
    }
}

#[cfg(target_os = "linux")]
fn platform_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir()
}

#[cfg(target_os = "macos")]
fn platform_log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Logs"))
}

#[cfg(windows)]
fn platform_log_dir() -> Option<PathBuf> {
    dirs::data_dir()
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
fn platform_log_dir() -> Option<PathBuf> {
    None
}

/// Picks the console filter: the configured level, raised by `-v`.
pub fn console_filter(configured: &str, verbose: u8) -> LevelFilter {
    match verbose {
        0 => configured.parse().unwrap_or(LevelFilter::INFO),
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the file filter.
pub fn init(path: &Path, config: &LogConfig, verbose: u8) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))?;

    let file_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.file_level)?,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(console_filter(&config.console_level, verbose)),
        )
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_names_file() {
        let path = default_log_path();
        assert_eq!(path.file_name().unwrap(), LOG_FILE);
    }

    #[test]
    fn test_console_filter() {
        assert_eq!(console_filter("warn", 0), LevelFilter::WARN);
        assert_eq!(console_filter("bogus", 0), LevelFilter::INFO);
        assert_eq!(console_filter("warn", 1), LevelFilter::DEBUG);
        assert_eq!(console_filter("warn", 3), LevelFilter::TRACE);
    }
}
