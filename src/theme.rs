//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Scheme;
use crate::config::BlockColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const ONEDARK_RED: Color = Color::Rgb(0xE0, 0x6C, 0x75);
const ONEDARK_GREEN: Color = Color::Rgb(0x98, 0xC3, 0x79);
const ONEDARK_BLUE: Color = Color::Rgb(0x61, 0xAF, 0xEF);
const ONEDARK_YELLOW: Color = Color::Rgb(0xE5, 0xC0, 0x7B);
const ONEDARK_MAGENTA: Color = Color::Rgb(0xC6, 0x78, 0xDD);
const ONEDARK_CYAN: Color = Color::Rgb(0x56, 0xB6, 0xC2);

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Block colours in `BlockColor::index` order: red, green, blue, yellow, magenta, cyan.
    pub blocks: [Color; 6],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, clicks).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and the dotted empty cells.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults (same hex values as onedark.theme).
    pub fn onedark_default() -> Self {
        Self {
            blocks: [
                ONEDARK_RED,
                ONEDARK_GREEN,
                ONEDARK_BLUE,
                ONEDARK_YELLOW,
                ONEDARK_MAGENTA,
                ONEDARK_CYAN,
            ],
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: ONEDARK_YELLOW,
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, scheme: Scheme) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_scheme(scheme)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_scheme(scheme);
        Ok(theme)
    }

    fn default_for_scheme(scheme: Scheme) -> Self {
        let mut t = Self::onedark_default();
        t.apply_scheme(scheme);
        t
    }

    /// Override block colours for high-contrast or colorblind play.
    pub fn apply_scheme(&mut self, scheme: Scheme) {
        match scheme {
            Scheme::Normal => {}
            Scheme::HighContrast => {
                self.blocks = [
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0xFF),
                ];
            }
            Scheme::Colorblind => {
                // Paul Tol's vibrant set; red and green never sit side by side
                self.blocks = [
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0x33, 0xBB, 0xEE),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let base = Self::onedark_default();
        Self {
            blocks: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(ONEDARK_RED),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(ONEDARK_GREEN),
                get("cpu_box").unwrap_or(ONEDARK_BLUE),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(ONEDARK_YELLOW),
                get("net_box").unwrap_or(ONEDARK_MAGENTA),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(ONEDARK_CYAN),
            ],
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    #[inline]
    pub fn block_color(&self, color: BlockColor) -> Color {
        self.blocks[color.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |digits: &str| {
        u8::from_str_radix(digits, 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 if s.is_ascii() => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
