//! Game state: grid, click budget, score, preview row, row spawning, game over.

use crate::config::{BlockColor, GameConfig, MIN_CLEAR_EXCLUSIVE};
use crate::grid::{self, Grid};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Why an activation changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    GameOver,
    NoClicksLeft,
    OutOfBounds,
    EmptyCell,
    /// Group of one: isolated blocks don't react to clicks.
    SingleBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned,
    /// Every row is already in play; the session is over and nothing moved.
    BoardFull,
}

/// Result of one cell activation, handled to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Ignored(Ignored),
    Cleared {
        size: usize,
        /// Set when this clear used up the click budget.
        spawn: Option<SpawnOutcome>,
    },
}

/// One game session. Owns the grid; adapters only read it through the accessors.
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    rng: StdRng,
    grid: Grid,
    active_rows: usize,
    preview: Vec<BlockColor>,
    clicks_left: u32,
    score: u32,
    clears: u32,
    rows_spawned: u32,
    phase: Phase,
}

impl GameState {
    /// Seeded from `config.seed` when set, otherwise from OS entropy.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &GameConfig, mut rng: StdRng) -> Self {
        let grid = Grid::initialize(
            config.rows,
            config.cols,
            config.active_rows,
            &config.palette,
            &mut rng,
        );
        let preview = grid::random_row(config.cols, &config.palette, &mut rng);
        info!(
            rows = config.rows,
            cols = config.cols,
            active_rows = config.active_rows,
            colors = config.palette.len(),
            "new game"
        );
        Self {
            config: config.clone(),
            rng,
            grid,
            active_rows: config.active_rows,
            preview,
            clicks_left: config.clicks_per_row,
            score: 0,
            clears: 0,
            rows_spawned: 0,
            phase: Phase::Playing,
        }
    }

    /// Full reset: fresh grid, preview, score and budget. The RNG stream continues.
    pub fn restart(&mut self) {
        let rng = std::mem::replace(&mut self.rng, StdRng::seed_from_u64(0));
        let config = self.config.clone();
        *self = Self::with_rng(&config, rng);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn preview(&self) -> &[BlockColor] {
        &self.preview
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn clicks_left(&self) -> u32 {
        self.clicks_left
    }

    pub fn active_rows(&self) -> usize {
        self.active_rows
    }

    pub fn clears(&self) -> u32 {
        self.clears
    }

    pub fn rows_spawned(&self) -> u32 {
        self.rows_spawned
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Click on `(row, col)`: find the group, clear it if big enough, settle the board,
    /// spend one click and force a new row when the budget runs out.
    pub fn handle_activation(&mut self, row: usize, col: usize) -> Activation {
        let ignored = |reason: Ignored| {
            trace!(row, col, ?reason, "activation ignored");
            Activation::Ignored(reason)
        };
        if self.phase == Phase::GameOver {
            return ignored(Ignored::GameOver);
        }
        if self.clicks_left == 0 {
            return ignored(Ignored::NoClicksLeft);
        }
        match self.grid.cell_at(row, col) {
            Err(_) => return ignored(Ignored::OutOfBounds),
            Ok(cell) if cell.is_empty() => return ignored(Ignored::EmptyCell),
            Ok(_) => {}
        }

        let group = grid::find_group(&self.grid, row, col);
        if group.len() <= MIN_CLEAR_EXCLUSIVE {
            return ignored(Ignored::SingleBlock);
        }

        let size = group.len();
        self.grid.clear(&group);
        grid::settle(&mut self.grid);
        self.score = self.score.saturating_add(size as u32);
        self.clears += 1;
        self.clicks_left -= 1;
        debug!(
            row,
            col,
            size,
            score = self.score,
            clicks_left = self.clicks_left,
            "cleared group"
        );

        let spawn = (self.clicks_left == 0).then(|| self.spawn_row());
        Activation::Cleared { size, spawn }
    }

    /// Push the preview row in at the bottom and raise everything by one row.
    /// When every row is already active the session ends instead and the grid is left alone.
    pub fn spawn_row(&mut self) -> SpawnOutcome {
        if self.phase == Phase::GameOver || self.active_rows >= self.grid.rows() {
            self.phase = Phase::GameOver;
            info!(
                score = self.score,
                active_rows = self.active_rows,
                "board full, game over"
            );
            return SpawnOutcome::BoardFull;
        }

        let incoming = std::mem::replace(
            &mut self.preview,
            grid::random_row(self.config.cols, &self.config.palette, &mut self.rng),
        );
        self.grid.shift_up(&incoming);
        self.active_rows += 1;
        self.rows_spawned += 1;
        self.clicks_left = self.config.clicks_per_row;
        let row: String = incoming.iter().map(|c| c.letter()).collect();
        debug!(active_rows = self.active_rows, %row, "row spawned");
        SpawnOutcome::Spawned
    }
}

#[cfg(test)]
impl GameState {
    /// Session over a hand-built grid and preview row.
    pub(crate) fn from_parts(
        config: &GameConfig,
        grid: Grid,
        active_rows: usize,
        preview: Vec<BlockColor>,
    ) -> Self {
        let mut state = Self::with_rng(config, StdRng::seed_from_u64(99));
        state.grid = grid;
        state.active_rows = active_rows;
        state.preview = preview;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Palette;
    use crate::grid::Cell;

    fn config(rows: usize, cols: usize, active_rows: usize, clicks: u32) -> GameConfig {
        GameConfig {
            rows,
            cols,
            active_rows,
            clicks_per_row: clicks,
            palette: Palette::default(),
            seed: Some(5),
        }
    }

    fn ten_by_ten() -> GameState {
        let grid = Grid::from_picture(
            "
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            rrgbygbygb
            rrbygbygby
            rbygbygbyg
            ",
        );
        let preview = vec![BlockColor::Green; 10];
        GameState::from_parts(&config(10, 10, 3, 3), grid, 3, preview)
    }

    #[test]
    fn new_game_starts_playing_with_full_budget() {
        let state = GameState::new(&config(10, 10, 3, 3));
        assert_eq!(state.phase(), Phase::Playing);
        assert_eq!(state.clicks_left(), 3);
        assert_eq!(state.score(), 0);
        assert_eq!(state.active_rows(), 3);
        assert_eq!(state.preview().len(), 10);
        assert_eq!(state.grid().filled_count(), 30);
    }

    #[test]
    fn same_seed_same_board() {
        let a = GameState::new(&config(8, 8, 4, 3));
        let b = GameState::new(&config(8, 8, 4, 3));
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.preview(), b.preview());
    }

    #[test]
    fn clearing_five_block_group() {
        let mut state = ten_by_ten();
        let result = state.handle_activation(8, 1);
        assert_eq!(result, Activation::Cleared { size: 5, spawn: None });
        assert_eq!(state.score(), 5);
        assert_eq!(state.clicks_left(), 2);
        assert_eq!(state.grid().filled_count(), 25);
        assert_eq!(state.grid().cols(), 10);
        // Column 0 emptied: the rest slide left by the centring rule (E = 1 -> 0 left, 1 right).
        assert!(state.grid().is_column_empty(9));
        assert_eq!(state.grid().get(9, 0), Some(Cell::Filled(BlockColor::Blue)));
        assert_eq!(state.grid().get(8, 0), Some(Cell::Empty));
        assert_eq!(state.grid().get(9, 1), Some(Cell::Filled(BlockColor::Yellow)));
    }

    #[test]
    fn single_block_is_inert() {
        let mut state = ten_by_ten();
        let before = state.grid().clone();
        assert_eq!(
            state.handle_activation(9, 1),
            Activation::Ignored(Ignored::SingleBlock)
        );
        assert_eq!(state.grid(), &before);
        assert_eq!(state.score(), 0);
        assert_eq!(state.clicks_left(), 3);
    }

    #[test]
    fn empty_and_outside_cells_are_ignored() {
        let mut state = ten_by_ten();
        assert_eq!(
            state.handle_activation(0, 0),
            Activation::Ignored(Ignored::EmptyCell)
        );
        assert_eq!(
            state.handle_activation(10, 3),
            Activation::Ignored(Ignored::OutOfBounds)
        );
        assert_eq!(state.clicks_left(), 3);
    }

    #[test]
    fn budget_exhaustion_spawns_preview_row() {
        let grid = Grid::from_picture(
            "
            ..
            ..
            rr
            gg
            bb
            yy
            ",
        );
        let preview = vec![BlockColor::Magenta, BlockColor::Cyan];
        let mut state = GameState::from_parts(&config(6, 2, 4, 3), grid, 4, preview.clone());

        assert!(matches!(state.handle_activation(5, 0), Activation::Cleared { size: 2, spawn: None }));
        assert!(matches!(state.handle_activation(5, 1), Activation::Cleared { size: 2, spawn: None }));
        assert_eq!(state.clicks_left(), 1);
        assert_eq!(
            state.handle_activation(5, 0),
            Activation::Cleared {
                size: 2,
                spawn: Some(SpawnOutcome::Spawned)
            }
        );

        assert_eq!(state.score(), 6);
        assert_eq!(state.active_rows(), 5);
        assert_eq!(state.clicks_left(), 3);
        assert_eq!(state.rows_spawned(), 1);
        assert_eq!(state.grid().to_picture(), "..\n..\n..\n..\nrr\nmc");
        assert_eq!(state.preview().len(), 2);
        assert!(
            state
                .preview()
                .iter()
                .all(|c| Palette::default().colors().contains(c))
        );
    }

    #[test]
    fn board_full_ends_game_without_touching_grid() {
        let grid = Grid::from_picture(
            "
            rr
            gg
            bb
            ",
        );
        let mut state = GameState::from_parts(&config(3, 2, 3, 1), grid, 3, vec![BlockColor::Red; 2]);
        assert_eq!(
            state.handle_activation(0, 0),
            Activation::Cleared {
                size: 2,
                spawn: Some(SpawnOutcome::BoardFull)
            }
        );
        assert_eq!(state.phase(), Phase::GameOver);
        assert_eq!(state.grid().to_picture(), "..\ngg\nbb");
        assert_eq!(state.score(), 2);

        let frozen = state.grid().clone();
        assert_eq!(
            state.handle_activation(1, 0),
            Activation::Ignored(Ignored::GameOver)
        );
        assert_eq!(state.grid(), &frozen);
        assert_eq!(state.score(), 2);
    }

    #[test]
    fn spawn_on_full_board_is_terminal() {
        let mut state = GameState::new(&config(4, 3, 4, 3));
        let before = state.grid().clone();
        let preview = state.preview().to_vec();
        assert_eq!(state.spawn_row(), SpawnOutcome::BoardFull);
        assert_eq!(state.grid(), &before);
        assert_eq!(state.preview(), preview.as_slice());
        assert_eq!(state.active_rows(), 4);
        assert_eq!(state.phase(), Phase::GameOver);
    }

    #[test]
    fn spawn_copies_preview_verbatim() {
        let mut state = GameState::new(&config(10, 10, 3, 3));
        let preview = state.preview().to_vec();
        assert_eq!(state.spawn_row(), SpawnOutcome::Spawned);
        let bottom: Vec<BlockColor> = state
            .grid()
            .iter_rows()
            .last()
            .unwrap()
            .iter()
            .map(|c| c.color().unwrap())
            .collect();
        assert_eq!(bottom, preview);
        assert_eq!(state.active_rows(), 4);
        assert_eq!(state.grid().filled_count(), 40);
    }

    #[test]
    fn score_is_sum_of_cleared_groups() {
        let mut state = GameState::new(&config(10, 10, 6, 3));
        let mut total = 0u32;
        let mut last_score = 0u32;
        'outer: for _ in 0..20 {
            for row in 0..10 {
                for col in 0..10 {
                    if let Activation::Cleared { size, .. } = state.handle_activation(row, col) {
                        total += size as u32;
                    }
                    assert!(state.score() >= last_score);
                    last_score = state.score();
                    if state.phase() == Phase::GameOver {
                        break 'outer;
                    }
                }
            }
        }
        assert_eq!(state.score(), total);
        assert!(state.clears() > 0);
    }

    #[test]
    fn restart_resets_everything() {
        let mut state = ten_by_ten();
        state.handle_activation(8, 1);
        state.restart();
        assert_eq!(state.score(), 0);
        assert_eq!(state.clicks_left(), 3);
        assert_eq!(state.active_rows(), 3);
        assert_eq!(state.clears(), 0);
        assert_eq!(state.phase(), Phase::Playing);
        assert_eq!(state.grid().filled_count(), 30);
    }
}
