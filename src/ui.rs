//! Layout and drawing: name prompt, board, next-row preview, sidebar, game over.

use crate::app::Screen;
use crate::game::GameState;
use crate::grid::Cell;
use crate::input::Cursor;
use crate::leaderboard::Leaderboard;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each cell is two terminal columns wide so blocks look square.
pub const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;
/// Stats box, gap, leaderboard box.
const SIDEBAR_HEIGHT: u16 = 8 + 1 + 8;
/// Border + one row of preview blocks.
const PREVIEW_HEIGHT: u16 = 3;
/// Flash on the freshly pushed row.
const SPAWN_FLASH_MS: u32 = 350;
/// Longest name the prompt accepts.
pub const MAX_NAME_LEN: usize = 16;

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub player_name: &'a str,
    pub name_input: &'a str,
    pub leaderboard: &'a Leaderboard,
    /// Leaderboard position of the finished game, if it made the table.
    pub last_rank: Option<usize>,
    pub seconds: u64,
    pub cursor: Cursor,
    pub sound_on: bool,
}

/// Screen areas for the game view. `board` is the inner grid area used for mouse hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    pub board_outer: Rect,
    pub board: Rect,
    pub preview: Rect,
    pub sidebar: Rect,
}

/// Centre board + preview + sidebar in `area`.
pub fn game_layout(area: Rect, rows: usize, cols: usize) -> GameLayout {
    // Saturate so oversized boards get clipped instead of overflowing.
    let grid_w = u16::try_from(cols)
        .unwrap_or(u16::MAX)
        .saturating_mul(CELL_WIDTH);
    let grid_h = u16::try_from(rows).unwrap_or(u16::MAX);
    let pw = grid_w.saturating_add(2);
    let ph = grid_h.saturating_add(2);
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);
    let total_h = ph.saturating_add(PREVIEW_HEIGHT).max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(ph),
            Constraint::Length(PREVIEW_HEIGHT),
            Constraint::Fill(1),
        ])
        .split(columns[0]);

    let board_outer = left[0];
    let board = Rect {
        x: board_outer.x.saturating_add(1),
        y: board_outer.y.saturating_add(1),
        width: grid_w.min(board_outer.width.saturating_sub(2)),
        height: grid_h.min(board_outer.height.saturating_sub(2)),
    };
    GameLayout {
        board_outer,
        board,
        preview: left[1],
        sidebar: columns[1],
    }
}

/// White flash that fades back to the new row's colours.
pub fn spawn_flash() -> Effect {
    fx::fade_from(
        Color::White,
        Color::White,
        (SPAWN_FLASH_MS, Interpolation::Linear),
    )
}

/// Draw the current screen. A pending spawn flash is advanced by the time since the last frame.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    spawn_effect: &mut Option<Effect>,
    spawn_effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    match view.screen {
        Screen::NameEntry => draw_name_prompt(frame, view, area),
        Screen::Playing | Screen::GameOver => {
            let grid = view.state.grid();
            let layout = game_layout(area, grid.rows(), grid.cols());
            draw_board(frame, view, layout);
            draw_preview(frame, view, layout.preview);
            draw_sidebar(frame, view, layout.sidebar);
            if let Some(effect) = spawn_effect {
                let delta = spawn_effect_process_time
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or(std::time::Duration::ZERO);
                let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
                *spawn_effect_process_time = Some(now);
                let bottom_row = Rect {
                    y: layout.board.y + layout.board.height.saturating_sub(1),
                    height: layout.board.height.min(1),
                    ..layout.board
                };
                frame.render_effect(effect, bottom_row, TfxDuration::from_millis(delta_ms));
            }
            if view.screen == Screen::GameOver {
                draw_game_over(frame, view, area);
            }
        }
    }
}

fn border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.div_line).bg(theme.bg)
}

fn draw_board(frame: &mut Frame, view: &View, layout: GameLayout) {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme))
        .title(Span::styled(" CrashDown ", theme.title));
    block.render(layout.board_outer, frame.buffer_mut());

    let board = layout.board;
    let show_cursor = view.screen == Screen::Playing;
    let buf = frame.buffer_mut();
    for (r, row) in view.state.grid().iter_rows().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (Ok(c16), Ok(r16)) = (u16::try_from(c), u16::try_from(r)) else {
                continue;
            };
            let dx = c16.saturating_mul(CELL_WIDTH);
            if dx.saturating_add(CELL_WIDTH) > board.width || r16 >= board.height {
                continue;
            }
            let (x, y) = (board.x + dx, board.y + r16);
            let under_cursor = show_cursor && view.cursor.row == r && view.cursor.col == c;
            let (symbol, style) = match (*cell, under_cursor) {
                (Cell::Filled(color), false) => {
                    let fg = theme.block_color(color);
                    ("██", Style::default().fg(fg).bg(theme.bg))
                }
                (Cell::Filled(color), true) => (
                    "[]",
                    Style::default()
                        .fg(Color::Black)
                        .bg(theme.block_color(color))
                        .bold(),
                ),
                (Cell::Empty, false) => ("  ", Style::default().bg(theme.bg)),
                (Cell::Empty, true) => ("[]", Style::default().fg(theme.inactive_fg).bg(theme.bg)),
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}

fn draw_preview(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme))
        .title(Span::styled(" Next row ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    let spans: Vec<Span> = view
        .state
        .preview()
        .iter()
        .map(|&color| {
            let c = theme.block_color(color);
            Span::styled("██", Style::default().fg(c).bg(theme.bg))
        })
        .collect();
    Paragraph::new(Line::from(spans)).render(inner, frame.buffer_mut());
}

fn leaderboard_lines<'a>(view: &View<'a>) -> Vec<Line<'a>> {
    let theme = view.theme;
    if view.leaderboard.is_empty() {
        return vec![Line::from(Span::styled(
            "No scores yet",
            Style::default().fg(theme.inactive_fg),
        ))];
    }
    view.leaderboard
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let highlight = view.screen == Screen::GameOver && view.last_rank == Some(i);
            let style = if highlight {
                Style::default().fg(theme.title).bold()
            } else {
                Style::default().fg(theme.main_fg)
            };
            Line::from(Span::styled(format!("{}. {}: {}", i + 1, e.name, e.score), style))
        })
        .collect()
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Stats (border + 6 lines)
            Constraint::Length(1), // gap
            Constraint::Length(8), // Leaderboard (border + title + 5 entries)
        ])
        .split(area);

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme));
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_lines = vec![
        stat("Player: ", view.player_name.to_string()),
        stat("Score: ", state.score().to_string()),
        stat("Next row in: ", state.clicks_left().to_string()),
        stat(
            "Rows: ",
            format!("{}/{}", state.active_rows(), state.grid().rows()),
        ),
        stat("Time: ", format!("{}s", view.seconds)),
        stat("Sound: ", if view.sound_on { "on" } else { "off" }.to_string()),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Leaderboard ---
    let board_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme));
    let board_inner = board_block.inner(chunks[2]);
    board_block.render(chunks[2], frame.buffer_mut());
    let mut lines = vec![Line::from(Span::styled("Top scores", title_style))];
    lines.extend(leaderboard_lines(view));
    Paragraph::new(lines).render(board_inner, frame.buffer_mut());
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_name_prompt(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let entries = view.leaderboard.entries().len().max(1) as u16;
    let popup = centered(area, 36, 10 + entries);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Enter your name ", Style::default().fg(theme.title).bold())),
        Line::from(""),
        Line::from(vec![
            Span::styled(view.name_input, Style::default().fg(theme.main_fg)),
            Span::styled("_", Style::default().fg(theme.title)),
        ]),
        Line::from(""),
    ];
    lines.extend(leaderboard_lines(view));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Enter — start    Esc — quit ",
        Style::default().fg(theme.inactive_fg),
    )));

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(theme))
            .title(Span::styled(" CrashDown ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 30, 9);
    let mut lines = vec![
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", view.state.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Time: {}s ", view.seconds),
            Style::default().fg(theme.main_fg),
        )),
    ];
    match view.last_rank {
        Some(rank) => lines.push(Line::from(Span::styled(
            format!(" Leaderboard #{} ", rank + 1),
            Style::default().fg(Color::Yellow).bold(),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Restart    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));

    // Clear what's underneath so the board doesn't bleed through.
    let buf = frame.buffer_mut();
    for y in popup.y..popup.y + popup.height {
        for x in popup.x..popup.x + popup.width {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
        }
    }
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(theme)),
    );
    p.render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(view: &View, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| draw(f, view, &mut None, &mut None, Instant::now()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn view<'a>(
        screen: Screen,
        state: &'a GameState,
        theme: &'a Theme,
        board: &'a Leaderboard,
    ) -> View<'a> {
        View {
            screen,
            state,
            theme,
            player_name: "Anna",
            name_input: "An",
            leaderboard: board,
            last_rank: None,
            seconds: 42,
            cursor: Cursor::centered(10, 10),
            sound_on: true,
        }
    }

    #[test]
    fn layout_fits_board_cells() {
        let layout = game_layout(Rect::new(0, 0, 100, 30), 10, 10);
        assert_eq!(layout.board.width, 20);
        assert_eq!(layout.board.height, 10);
        assert_eq!(layout.board.x, layout.board_outer.x + 1);
        assert_eq!(layout.preview.y, layout.board_outer.y + layout.board_outer.height);
        assert_eq!(layout.sidebar.x, layout.board_outer.x + layout.board_outer.width);
    }

    #[test]
    fn oversized_board_is_clipped_not_overflowed() {
        let area = Rect::new(0, 0, 200, 50);
        let layout = game_layout(area, 10, 40_000);
        assert!(layout.board.width <= area.width);
        assert_eq!(layout.board.height, 10);
        let layout = game_layout(area, 70_000, 10);
        assert!(layout.board.height <= area.height);
    }

    #[test]
    fn large_board_renders_visible_part() {
        let state = GameState::new(&GameConfig {
            rows: 60,
            cols: 200,
            active_rows: 60,
            seed: Some(1),
            ..GameConfig::default()
        });
        let theme = Theme::default();
        let board = Leaderboard::default();
        let text = render(&view(Screen::Playing, &state, &theme, &board), 80, 24);
        assert_eq!(text.lines().count(), 24);
    }

    #[test]
    fn playing_screen_shows_stats() {
        let state = GameState::new(&GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        });
        let theme = Theme::default();
        let board = Leaderboard::default();
        let text = render(&view(Screen::Playing, &state, &theme, &board), 80, 24);
        assert!(text.contains("Player: Anna"));
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Next row in: 3"));
        assert!(text.contains("Time: 42s"));
        assert!(text.contains("No scores yet"));
    }

    #[test]
    fn name_prompt_echoes_input() {
        let state = GameState::new(&GameConfig::default());
        let theme = Theme::default();
        let mut board = Leaderboard::default();
        board.record("Bela", 17);
        let text = render(&view(Screen::NameEntry, &state, &theme, &board), 80, 24);
        assert!(text.contains("Enter your name"));
        assert!(text.contains("An_"));
        assert!(text.contains("1. Bela: 17"));
    }

    #[test]
    fn game_over_shows_rank() {
        let state = GameState::new(&GameConfig::default());
        let theme = Theme::default();
        let mut board = Leaderboard::default();
        board.record("Anna", 0);
        let mut v = view(Screen::GameOver, &state, &theme, &board);
        v.last_rank = Some(0);
        let text = render(&v, 80, 24);
        assert!(text.contains("Game Over"));
        assert!(text.contains("Leaderboard #1"));
    }
}
