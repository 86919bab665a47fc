//! Key bindings (normal and vim-style) and mouse clicks mapped onto board cells.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    Activate,
    Restart,
    ToggleSound,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, enter) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('m' | 'M') => Action::ToggleSound,
        _ => Action::None,
    }
}

/// Board cell under a left click, given the board's screen rect and cell width in columns.
/// Clicks past the drawn part of a clipped board hit nothing.
pub fn mouse_to_cell(
    event: MouseEvent,
    board: Rect,
    cell_width: u16,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    if event.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let dx = event.column.checked_sub(board.x)?;
    let dy = event.row.checked_sub(board.y)?;
    if dx >= board.width || dy >= board.height {
        return None;
    }
    let (row, col) = (dy as usize, (dx / cell_width.max(1)) as usize);
    (row < rows && col < cols).then_some((row, col))
}

/// Keyboard selection on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    /// Start on the bottom row, middle column.
    pub fn centered(rows: usize, cols: usize) -> Self {
        Self {
            row: rows.saturating_sub(1),
            col: cols / 2,
        }
    }

    /// Move one cell; stops at the edges.
    pub fn step(&mut self, action: Action, rows: usize, cols: usize) {
        match action {
            Action::CursorLeft => self.col = self.col.saturating_sub(1),
            Action::CursorRight => self.col = (self.col + 1).min(cols.saturating_sub(1)),
            Action::CursorUp => self.row = self.row.saturating_sub(1),
            Action::CursorDown => self.row = (self.row + 1).min(rows.saturating_sub(1)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn arrows_and_vim_keys_agree() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::CursorLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::CursorLeft);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::CursorDown);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::CursorDown);
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Activate);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Activate);
    }

    #[test]
    fn control_c_quits_and_other_chords_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_q), Action::None);
    }

    #[test]
    fn click_maps_to_cell() {
        let board = Rect::new(10, 5, 20, 10);
        assert_eq!(mouse_to_cell(click(10, 5), board, 2, 10, 10), Some((0, 0)));
        assert_eq!(mouse_to_cell(click(13, 14), board, 2, 10, 10), Some((9, 1)));
        assert_eq!(mouse_to_cell(click(29, 5), board, 2, 10, 10), Some((0, 9)));
    }

    #[test]
    fn clicks_outside_board_are_dropped() {
        let board = Rect::new(10, 5, 20, 10);
        assert_eq!(mouse_to_cell(click(9, 5), board, 2, 10, 10), None);
        assert_eq!(mouse_to_cell(click(30, 5), board, 2, 10, 10), None);
        assert_eq!(mouse_to_cell(click(12, 15), board, 2, 10, 10), None);
        let mut right = click(12, 6);
        right.kind = MouseEventKind::Down(MouseButton::Right);
        assert_eq!(mouse_to_cell(right, board, 2, 10, 10), None);
    }

    #[test]
    fn clicks_past_clipped_board_are_dropped() {
        // 10x10 board squeezed into 3 rows and 3 cells of width.
        let board = Rect::new(0, 0, 6, 3);
        assert_eq!(mouse_to_cell(click(5, 2), board, 2, 10, 10), Some((2, 2)));
        assert_eq!(mouse_to_cell(click(6, 0), board, 2, 10, 10), None);
        assert_eq!(mouse_to_cell(click(0, 3), board, 2, 10, 10), None);
    }

    #[test]
    fn cursor_stops_at_edges() {
        let mut cursor = Cursor::centered(10, 10);
        assert_eq!(cursor, Cursor { row: 9, col: 5 });
        cursor.step(Action::CursorDown, 10, 10);
        assert_eq!(cursor.row, 9);
        for _ in 0..20 {
            cursor.step(Action::CursorLeft, 10, 10);
            cursor.step(Action::CursorUp, 10, 10);
        }
        assert_eq!(cursor, Cursor { row: 0, col: 0 });
        cursor.step(Action::CursorRight, 10, 10);
        assert_eq!(cursor.col, 1);
    }
}
