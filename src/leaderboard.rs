//! Top scores, persisted as JSON under the XDG config dir (or ~/.config/crashdown).

use crate::config::LEADERBOARD_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const FILENAME: &str = "leaderboard.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid leaderboard json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Best scores, highest first. Ties keep the older entry ahead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<Entry>,
}

impl Leaderboard {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a score. Returns its 0-based rank, or None if it did not make the table.
    pub fn record(&mut self, name: &str, score: u32) -> Option<usize> {
        let rank = self.entries.iter().take_while(|e| e.score >= score).count();
        if rank >= LEADERBOARD_SIZE {
            return None;
        }
        self.entries.insert(
            rank,
            Entry {
                name: name.to_string(),
                score,
            },
        );
        self.entries.truncate(LEADERBOARD_SIZE);
        Some(rank)
    }

    /// Order and trim entries read from disk.
    fn sanitized(mut self) -> Self {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_SIZE);
        self
    }
}

/// Location of the leaderboard file.
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default path: `$XDG_CONFIG_HOME/crashdown/leaderboard.json`, else `~/.config/crashdown/...`.
    pub fn from_env() -> Self {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
            _ => std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".")),
        };
        Self::new(base.join("crashdown").join(FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empty table when the file is missing or unreadable.
    pub fn load(&self) -> Leaderboard {
        self.try_load().unwrap_or_else(|err| {
            warn!(%err, path = %self.path.display(), "leaderboard unreadable, starting empty");
            Leaderboard::default()
        })
    }

    /// Like `load`, but only a missing file counts as an empty table.
    pub fn try_load(&self) -> Result<Leaderboard, LeaderboardError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Leaderboard::default());
            }
            Err(err) => return Err(err.into()),
        };
        let board: Leaderboard = serde_json::from_slice(&bytes)?;
        Ok(board.sanitized())
    }

    /// Write the table, creating the config directory if needed.
    pub fn save(&self, board: &Leaderboard) -> Result<(), LeaderboardError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(board)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Game-over handoff: merge `score` into the stored table and write it back.
    /// Returns the updated table and the new entry's rank. A file that cannot be
    /// read back is left untouched.
    pub fn record_score(
        &self,
        name: &str,
        score: u32,
    ) -> Result<(Leaderboard, Option<usize>), LeaderboardError> {
        let mut board = self.try_load()?;
        let rank = board.record(name, score);
        self.save(&board)?;
        Ok((board, rank))
    }
}
