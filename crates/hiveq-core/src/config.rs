//! Configuration types for hiveq.
//!
//! [`Config::load`] reads `~/.config/hiveq/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::PathBuf;

use crate::types::DEFAULT_TIMESTAMP_FORMAT;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[output]
timestamp_format = "%Y-%m-%d %H:%M:%S%.7f"
color            = "auto"

[highlight]
fg = "black"
bg = "yellow"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/hiveq/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

/// When to emit ANSI colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Only when stdout is a terminal.
    Auto,
    Always,
    Never,
}

/// `[output]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_color")]
    pub color: ColorChoice,
}

fn default_timestamp_format() -> String { DEFAULT_TIMESTAMP_FORMAT.to_string() }
fn default_color() -> ColorChoice { ColorChoice::Auto }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            color: default_color(),
        }
    }
}

/// `[highlight]` section of `config.toml`. Colours every highlight rule
/// inherits.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_highlight_fg")]
    pub fg: String,
    #[serde(default = "default_highlight_bg")]
    pub bg: String,
}

fn default_highlight_fg() -> String { "black".to_string() }
fn default_highlight_bg() -> String { "yellow".to_string() }

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            fg: default_highlight_fg(),
            bg: default_highlight_bg(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/hiveq/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::from_sources(Some(path))
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        Self::from_sources(None).expect("built-in default config must be valid TOML")
    }

    fn from_sources(user_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(path) = user_file {
            builder = builder.add_source(config::File::from(path.as_path()).required(false));
        }
        builder.build()?.try_deserialize().map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("hiveq")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
