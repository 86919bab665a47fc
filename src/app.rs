//! App: terminal init, main loop, key and mouse handling.

use crate::audio::Chime;
use crate::clock::SessionClock;
use crate::config::GameConfig;
use crate::game::{Activation, GameState, Phase, SpawnOutcome};
use crate::input::{self, Action, Cursor, key_to_action};
use crate::leaderboard::{Leaderboard, LeaderboardStore};
use crate::theme::Theme;
use crate::ui::{self, MAX_NAME_LEN, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::io::Write;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{info, warn};

/// Redraw roughly 60 times a second.
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    NameEntry,
    Playing,
    GameOver,
}

pub struct App {
    theme: Theme,
    store: LeaderboardStore,
    state: GameState,
    leaderboard: Leaderboard,
    player_name: String,
    name_input: String,
    screen: Screen,
    clock: SessionClock,
    chime: Chime,
    cursor: Cursor,
    /// Position of the finished game in the leaderboard.
    last_rank: Option<usize>,
    /// TachyonFX flash on a freshly pushed row.
    spawn_effect: Option<Effect>,
    /// Last time we processed the spawn effect (for delta).
    spawn_effect_process_time: Option<Instant>,
    /// Board area from the last frame; mouse clicks are resolved against it.
    board_rect: Rect,
}

impl App {
    /// Without a name the app opens on the name prompt; the clock starts once play begins.
    pub fn new(
        config: GameConfig,
        theme: Theme,
        store: LeaderboardStore,
        name: Option<String>,
        sound_on: bool,
    ) -> Self {
        let state = GameState::new(&config);
        let leaderboard = store.load();
        let screen = if name.is_some() {
            Screen::Playing
        } else {
            Screen::NameEntry
        };
        Self {
            theme,
            store,
            cursor: Cursor::centered(config.rows, config.cols),
            state,
            leaderboard,
            player_name: name.unwrap_or_default(),
            name_input: String::new(),
            screen,
            clock: SessionClock::start(Instant::now()),
            chime: Chime::new(sound_on),
            last_rank: None,
            spawn_effect: None,
            spawn_effect_process_time: None,
            board_rect: Rect::default(),
        }
    }

    fn restart(&mut self, now: Instant) {
        self.state.restart();
        let grid = self.state.grid();
        self.cursor = Cursor::centered(grid.rows(), grid.cols());
        self.clock = SessionClock::start(now);
        self.screen = Screen::Playing;
        self.last_rank = None;
        self.spawn_effect = None;
        self.spawn_effect_process_time = None;
        info!(player = %self.player_name, "game restarted");
    }

    /// Activate a cell and react to what the engine reports.
    fn activate<W: Write>(&mut self, row: usize, col: usize, now: Instant, out: &mut W) {
        let Activation::Cleared { spawn, .. } = self.state.handle_activation(row, col) else {
            return;
        };
        if let Err(err) = self.chime.play(out) {
            warn!(%err, "could not ring the bell");
        }
        match spawn {
            Some(SpawnOutcome::Spawned) => {
                self.spawn_effect = Some(ui::spawn_flash());
                self.spawn_effect_process_time = None;
            }
            Some(SpawnOutcome::BoardFull) => self.finish_game(now),
            None => {}
        }
    }

    /// Stop the clock and hand the score to the leaderboard.
    fn finish_game(&mut self, now: Instant) {
        debug_assert_eq!(self.state.phase(), Phase::GameOver);
        self.clock.stop(now);
        self.screen = Screen::GameOver;
        let score = self.state.score();
        match self.store.record_score(&self.player_name, score) {
            Ok((board, rank)) => {
                self.leaderboard = board;
                self.last_rank = rank;
            }
            Err(err) => {
                warn!(%err, path = %self.store.path().display(), "leaderboard not saved");
                self.last_rank = self.leaderboard.record(&self.player_name, score);
            }
        }
        info!(
            player = %self.player_name,
            score,
            seconds = self.clock.seconds(),
            clears = self.state.clears(),
            rows_spawned = self.state.rows_spawned(),
            rank = ?self.last_rank,
            "game over"
        );
    }

    /// Returns true when the player asked to quit.
    fn handle_key<W: Write>(&mut self, key: KeyEvent, now: Instant, out: &mut W) -> bool {
        if self.screen == Screen::NameEntry {
            return self.handle_name_key(key, now);
        }
        let action = key_to_action(key);
        match (self.screen, action) {
            (_, Action::Quit) => return true,
            (_, Action::ToggleSound) => self.chime.toggle(),
            (Screen::GameOver, Action::Restart) => self.restart(now),
            (
                Screen::Playing,
                Action::CursorLeft | Action::CursorRight | Action::CursorUp | Action::CursorDown,
            ) => {
                let grid = self.state.grid();
                self.cursor.step(action, grid.rows(), grid.cols());
            }
            (Screen::Playing, Action::Activate) => {
                let Cursor { row, col } = self.cursor;
                self.activate(row, col, now, out);
            }
            _ => {}
        }
        false
    }

    /// Name prompt: printable characters are text here, so `q` does not quit.
    fn handle_name_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Enter => {
                let name = self.name_input.trim();
                if !name.is_empty() {
                    self.player_name = name.to_string();
                    self.name_input.clear();
                    self.clock = SessionClock::start(now);
                    self.screen = Screen::Playing;
                    info!(player = %self.player_name, "game started");
                }
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c)
                if !c.is_control() && self.name_input.chars().count() < MAX_NAME_LEN =>
            {
                self.name_input.push(c);
            }
            _ => {}
        }
        false
    }

    fn handle_mouse<W: Write>(&mut self, mouse: MouseEvent, now: Instant, out: &mut W) {
        if self.screen != Screen::Playing {
            return;
        }
        let grid = self.state.grid();
        let Some((row, col)) =
            input::mouse_to_cell(mouse, self.board_rect, ui::CELL_WIDTH, grid.rows(), grid.cols())
        else {
            return;
        };
        self.cursor = Cursor { row, col };
        self.activate(row, col, now, out);
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        info!(screen = ?self.screen, "session started");

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut bell = std::io::stdout();
        loop {
            let now = Instant::now();
            self.clock.tick(now);
            self.draw(terminal, now)?;

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let now = Instant::now();
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key, now, &mut bell) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse, now, &mut bell),
                        _ => {}
                    }
                }
            }
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal, now: Instant) -> Result<()> {
        let mut effect = self.spawn_effect.take();
        let mut effect_time = self.spawn_effect_process_time;
        let view = View {
            screen: self.screen,
            state: &self.state,
            theme: &self.theme,
            player_name: &self.player_name,
            name_input: &self.name_input,
            leaderboard: &self.leaderboard,
            last_rank: self.last_rank,
            seconds: self.clock.seconds(),
            cursor: self.cursor,
            sound_on: self.chime.is_enabled(),
        };
        let area = terminal
            .draw(|f| ui::draw(f, &view, &mut effect, &mut effect_time, now))?
            .area;

        let grid = self.state.grid();
        self.board_rect = ui::game_layout(area, grid.rows(), grid.cols()).board;
        self.spawn_effect = effect.filter(|e| !e.done());
        self.spawn_effect_process_time = self.spawn_effect.as_ref().and(effect_time);
        Ok(())
    }
}
