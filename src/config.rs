//! Game configuration: board size, palette, click budget. Validated before a session starts.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clicks allowed between two forced rows.
pub const DEFAULT_CLICKS_PER_ROW: u32 = 3;

/// Number of leaderboard entries kept on disk.
pub const LEADERBOARD_SIZE: usize = 5;

/// A group must be strictly larger than this to be cleared.
pub const MIN_CLEAR_EXCLUSIVE: usize = 1;

/// Largest board side the terminal layout can address.
pub const MAX_BOARD_SIDE: usize = 1000;

/// Block colours a palette may be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl BlockColor {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Magenta,
        Self::Cyan,
    ];

    /// Index into the theme's block colour table.
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Yellow => 3,
            Self::Magenta => 4,
            Self::Cyan => 5,
        }
    }

    /// Single-letter tag, used in logs and board pictures.
    pub fn letter(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Yellow => 'y',
            Self::Magenta => 'm',
            Self::Cyan => 'c',
        }
    }
}

#[cfg(test)]
impl BlockColor {
    pub(crate) fn from_letter(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.letter() == c)
    }
}

/// Ordered set of at least two distinct block colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<BlockColor>,
}

impl Palette {
    pub fn new(colors: Vec<BlockColor>) -> Result<Self, ConfigError> {
        if colors.len() < 2 {
            return Err(ConfigError::PaletteTooSmall(colors.len()));
        }
        for (i, color) in colors.iter().enumerate() {
            if colors[..i].contains(color) {
                return Err(ConfigError::DuplicateColor(*color));
            }
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[BlockColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }
}

impl Default for Palette {
    /// Red, green, blue, yellow.
    fn default() -> Self {
        Self {
            colors: BlockColor::ALL[..4].to_vec(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board must have at least one row and one column (got {rows}x{cols})")]
    EmptyBoard { rows: usize, cols: usize },
    #[error("active rows must be between 1 and {rows} (got {active})")]
    ActiveRows { active: usize, rows: usize },
    #[error("palette needs at least 2 colours (got {0})")]
    PaletteTooSmall(usize),
    #[error("palette lists {0:?} more than once")]
    DuplicateColor(BlockColor),
    #[error("board is at most {max}x{max} (got {rows}x{cols})")]
    BoardTooLarge { rows: usize, cols: usize, max: usize },
    #[error("click budget per row must be at least 1")]
    ZeroClickBudget,
}

/// Options that shape one game session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Bottom rows filled at session start.
    pub active_rows: usize,
    pub clicks_per_row: u32,
    pub palette: Palette,
    /// Fixed RNG seed; random when None.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            active_rows: 3,
            clicks_per_row: DEFAULT_CLICKS_PER_ROW,
            palette: Palette::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.rows > MAX_BOARD_SIDE || self.cols > MAX_BOARD_SIDE {
            return Err(ConfigError::BoardTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_BOARD_SIDE,
            });
        }
        if self.active_rows == 0 || self.active_rows > self.rows {
            return Err(ConfigError::ActiveRows {
                active: self.active_rows,
                rows: self.rows,
            });
        }
        if self.clicks_per_row == 0 {
            return Err(ConfigError::ZeroClickBudget);
        }
        Ok(())
    }
}
