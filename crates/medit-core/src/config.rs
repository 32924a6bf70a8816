//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! The `#[derive(Serialize, Deserialize)]` macro generates the code to turn
//! these structs into TOML and back. `#[serde(default)]` fills missing
//! fields from `Default::default()`, so a config file only needs to mention
//! the settings it changes:
//!
//! ```toml
//! [editor]
//! prompt = "medit> "
//! min_context = 8
//!
//! [log]
//! console_level = "warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing loop settings
    pub editor: EditorConfig,

    /// Log sink settings
    pub log: LogConfig,
}

impl Config {
    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path, or defaults if there is no file.
    pub fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("medit").join("config.toml"))
    }
}

/// Editing loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Fewest lines shown on each side of the cursor
    pub min_context: usize,

    /// Command prompt
    pub prompt: String,

    /// Draw the cursor line in color
    pub highlight_cursor_line: bool,

    /// Clear the screen before every redraw
    pub clear_screen: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_context: 5,
            prompt: "::> ".to_string(),
            highlight_cursor_line: true,
            clear_screen: true,
        }
    }
}

/// Log sink configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file location (None = platform default)
    pub file: Option<PathBuf>,

    /// Filter for the log file
    pub file_level: String,

    /// Filter for messages echoed to the console
    pub console_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            file_level: "debug".to_string(),
            console_level: "info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
