//! Board grid: cells, flood fill, column gravity, horizontal re-centering, row shift.

use crate::config::{BlockColor, Palette};
use rand::Rng;
use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;

/// Up, down, left, right. Diagonals never connect.
const NEIGHBOURS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Single cell: either empty or a block of one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(BlockColor),
}

impl Cell {
    #[inline]
    pub fn color(self) -> Option<BlockColor> {
        match self {
            Self::Empty => None,
            Self::Filled(c) => Some(c),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Fixed-size board. Row 0 is the top; the play field grows upward from row `rows - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// cells[row][col]. Front of the deque is the top row.
    cells: VecDeque<Vec<Cell>>,
}

impl Grid {
    pub fn empty(rows: usize, cols: usize) -> Self {
        let cells = (0..rows).map(|_| vec![Cell::Empty; cols]).collect();
        Self { rows, cols, cells }
    }

    /// Fill the bottom `active_rows` rows with random colours; everything above is empty.
    pub fn initialize<R: Rng>(
        rows: usize,
        cols: usize,
        active_rows: usize,
        palette: &Palette,
        rng: &mut R,
    ) -> Self {
        let mut grid = Self::empty(rows, cols);
        let first_active = rows.saturating_sub(active_rows);
        for row in first_active..rows {
            grid.cells[row] = random_row(cols, palette, rng)
                .into_iter()
                .map(Cell::Filled)
                .collect();
        }
        grid
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Checked lookup for callers holding external coordinates.
    pub fn cell_at(&self, row: usize, col: usize) -> Result<Cell, GridError> {
        self.get(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Lookup that treats out-of-range as "nothing there".
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Overwrite one cell.
    ///
    /// # Panics
    /// If `(row, col)` is outside the grid. Every internal caller iterates in bounds.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        assert!(
            self.in_bounds(row, col),
            "set_cell({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        self.cells[row][col] = cell;
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn is_column_empty(&self, col: usize) -> bool {
        self.cells.iter().all(|r| r.get(col).is_none_or(|c| c.is_empty()))
    }

    /// Empty every listed position. Out-of-range positions are skipped.
    pub fn clear(&mut self, cells: &BTreeSet<(usize, usize)>) {
        for &(row, col) in cells {
            if self.in_bounds(row, col) {
                self.set_cell(row, col, Cell::Empty);
            }
        }
    }

    /// Drop the top row, move every row up by one and append `bottom` as the new last row.
    ///
    /// # Panics
    /// If `bottom` is not exactly one row wide.
    pub fn shift_up(&mut self, bottom: &[BlockColor]) {
        assert_eq!(bottom.len(), self.cols, "new row must span the grid");
        self.cells.pop_front();
        self.cells
            .push_back(bottom.iter().copied().map(Cell::Filled).collect());
    }

    fn column(&self, col: usize) -> Vec<Cell> {
        self.cells.iter().map(|r| r[col]).collect()
    }

    fn set_column(&mut self, col: usize, column: &[Cell]) {
        for (row, cell) in self.cells.iter_mut().zip(column) {
            row[col] = *cell;
        }
    }
}

/// One row of independent uniform draws from `palette`.
pub fn random_row<R: Rng>(cols: usize, palette: &Palette, rng: &mut R) -> Vec<BlockColor> {
    let colors = palette.colors();
    (0..cols)
        .map(|_| colors[rng.gen_range(0..colors.len())])
        .collect()
}

/// Maximal 4-connected set of same-coloured blocks containing `(row, col)`.
/// Empty set when the start is empty or out of range.
pub fn find_group(grid: &Grid, row: usize, col: usize) -> BTreeSet<(usize, usize)> {
    let mut group = BTreeSet::new();
    let Some(color) = grid.get(row, col).and_then(Cell::color) else {
        return group;
    };

    let mut stack = vec![(row, col)];
    group.insert((row, col));
    while let Some((r, c)) = stack.pop() {
        for (dr, dc) in NEIGHBOURS_4 {
            let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc)) else {
                continue;
            };
            if grid.get(nr, nc) == Some(Cell::Filled(color)) && group.insert((nr, nc)) {
                stack.push((nr, nc));
            }
        }
    }
    group
}

/// Let blocks fall within each column, keeping their top-to-bottom order.
pub fn apply_gravity(grid: &mut Grid) {
    for col in 0..grid.cols {
        let column = grid.column(col);
        let blocks: Vec<Cell> = column.iter().copied().filter(|c| !c.is_empty()).collect();
        if blocks.len() == column.len() {
            continue;
        }
        let mut settled = vec![Cell::Empty; grid.rows - blocks.len()];
        settled.extend(blocks);
        grid.set_column(col, &settled);
    }
}

/// Move non-empty columns together as one block, centred with `floor(E/2)` empty columns on the left.
pub fn recenter(grid: &mut Grid) {
    let occupied: Vec<usize> = (0..grid.cols).filter(|&c| !grid.is_column_empty(c)).collect();
    if occupied.is_empty() {
        return;
    }
    let left = (grid.cols - occupied.len()) / 2;
    let columns: Vec<Vec<Cell>> = occupied.iter().map(|&c| grid.column(c)).collect();
    let blank = vec![Cell::Empty; grid.rows];
    for col in 0..grid.cols {
        let source = col
            .checked_sub(left)
            .and_then(|i| columns.get(i))
            .unwrap_or(&blank);
        grid.set_column(col, source);
    }
}

/// Gravity then re-centering, as one step.
pub fn settle(grid: &mut Grid) {
    apply_gravity(grid);
    recenter(grid);
}

#[cfg(test)]
impl Grid {
    pub(crate) fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .count()
    }

    /// Build a grid from rows of colour letters (`r g b y m c`), `.` for empty.
    pub(crate) fn from_picture(picture: &str) -> Self {
        let cells: VecDeque<Vec<Cell>> = picture
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| {
                l.chars()
                    .map(|ch| BlockColor::from_letter(ch).map_or(Cell::Empty, Cell::Filled))
                    .collect()
            })
            .collect();
        let rows = cells.len();
        let cols = cells.front().map_or(0, Vec::len);
        Self { rows, cols, cells }
    }

    pub(crate) fn to_picture(&self) -> String {
        self.cells
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| c.color().map_or('.', BlockColor::letter))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
