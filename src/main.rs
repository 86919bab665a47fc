//! CrashDown: click connected colour groups before the rising rows fill the board.

mod app;
mod audio;
mod clock;
mod config;
mod game;
mod grid;
mod input;
mod leaderboard;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use config::{BlockColor, GameConfig, Palette};
use leaderboard::LeaderboardStore;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let config = args.game_config()?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.scheme).unwrap_or_default();
    let store = args
        .leaderboard
        .clone()
        .map_or_else(LeaderboardStore::from_env, LeaderboardStore::new);
    let name = args
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let mut app = App::new(config, theme, store, name, !args.mute);
    app.run()?;
    Ok(())
}

/// Logs go to a file; the terminal belongs to the game.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

/// Same-colour collapse puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "crashdown",
    version,
    about = "Clear groups of same-coloured blocks; every few clicks a new row pushes the board up.",
    long_about = "CrashDown is a terminal collapse puzzle.\n\n\
        Click (or select and press Enter on) a group of two or more touching blocks of one \
        colour to clear it. Blocks fall, columns slide back to the centre. Every few clears a \
        new row, shown in the preview, is pushed in from the bottom. The game ends when the \
        board is full and a row has to be added.\n\n\
        CONTROLS:\n  Mouse       Click a block\n  Arrows/hjkl Move cursor   Enter/Space  Clear group\n  \
        M           Toggle sound  R            Restart (game over)   Q / Esc  Quit"
)]
pub struct Args {
    /// Board height in cells.
    #[arg(long, default_value = "10", value_name = "ROWS")]
    pub rows: usize,

    /// Board width in cells.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub cols: usize,

    /// Rows filled with blocks when the game starts.
    #[arg(long, default_value = "3", value_name = "N")]
    pub active_rows: usize,

    /// Clears allowed before a new row is pushed in.
    #[arg(long, default_value = "3", value_name = "N")]
    pub clicks: u32,

    /// Block colours in play, comma separated (at least two, no repeats).
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "red,green,blue,yellow"
    )]
    pub colors: Vec<BlockColor>,

    /// Player name for the leaderboard. Asked for on start when not given.
    #[arg(short, long)]
    pub name: Option<String>,

    /// RNG seed for a reproducible board.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour scheme: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub scheme: Scheme,

    /// Leaderboard file. Defaults to the config dir (crashdown/leaderboard.json).
    #[arg(long, value_name = "FILE")]
    pub leaderboard: Option<PathBuf>,

    /// Start with the click sound off (toggle in game with M).
    #[arg(long)]
    pub mute: bool,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn game_config(&self) -> Result<GameConfig> {
        let config = GameConfig {
            rows: self.rows,
            cols: self.cols,
            active_rows: self.active_rows,
            clicks_per_row: self.clicks,
            palette: Palette::new(self.colors.clone())?,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scheme {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
