//! Output styling resolved from [`Config`].
//!
//! Colour names are parsed once at startup into `crossterm` colours. Resolve
//! with [`OutputStyle::from_config`] and pass the result to the renderer.

use crossterm::style::Color;
use hiveq_core::config::{ColorChoice, Config};
use tracing::warn;

const DEFAULT_HIGHLIGHT_FG: Color = Color::Black;
const DEFAULT_HIGHLIGHT_BG: Color = Color::DarkYellow;

/// Foreground/background every highlight rule inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightColors {
    pub fg: Color,
    pub bg: Color,
}

impl Default for HighlightColors {
    fn default() -> Self {
        Self {
            fg: DEFAULT_HIGHLIGHT_FG,
            bg: DEFAULT_HIGHLIGHT_BG,
        }
    }
}

/// Everything the renderer needs to know about presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStyle {
    /// `chrono` format string for last-write timestamps.
    pub timestamp_format: String,
    /// Emit ANSI escape codes.
    pub color: bool,
    pub highlight: HighlightColors,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self::from_config(&Config::defaults(), false)
    }
}

impl OutputStyle {
    /// Resolve `config`. `is_terminal` decides [`ColorChoice::Auto`].
    ///
    /// Unknown colour names fall back to the defaults with a warning.
    pub fn from_config(config: &Config, is_terminal: bool) -> Self {
        let color = match config.output.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => is_terminal,
        };
        Self {
            timestamp_format: config.output.timestamp_format.clone(),
            color,
            highlight: HighlightColors {
                fg: resolve(&config.highlight.fg, DEFAULT_HIGHLIGHT_FG),
                bg: resolve(&config.highlight.bg, DEFAULT_HIGHLIGHT_BG),
            },
        }
    }
}

fn resolve(name: &str, fallback: Color) -> Color {
    parse_color(name).unwrap_or_else(|| {
        warn!(color = name, "theme: unknown colour, using default");
        fallback
    })
}

/// Parse a colour name into a crossterm [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
pub fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::DarkRed),
        "green" => Some(Color::DarkGreen),
        "yellow" => Some(Color::DarkYellow),
        "blue" => Some(Color::DarkBlue),
        "magenta" => Some(Color::DarkMagenta),
        "cyan" => Some(Color::DarkCyan),
        "gray" | "grey" => Some(Color::Grey),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGrey),
        "light_red" => Some(Color::Red),
        "light_green" => Some(Color::Green),
        "light_yellow" => Some(Color::Yellow),
        "light_blue" => Some(Color::Blue),
        "light_magenta" => Some(Color::Magenta),
        "light_cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 && s.is_ascii() => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb { r, g, b })
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::AnsiValue(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
