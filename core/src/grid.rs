//! The N×N board and its cells.
//!
//! Cells are stored as a flat row-major `Vec` (indices `0..n` are row 0,
//! `n..2n` row 1, and so on). A grid is a plain value: moves produce new
//! grids and comparing two grids cell for cell is how no-op moves are
//! detected.

use std::fmt;

use serde::Serialize;

use crate::error::GridError;

/// Side length used by [`Grid::default`].
pub const DEFAULT_SIZE: usize = 4;

/// Largest tile a cell can hold. Two of these never merge.
pub const MAX_TILE: u32 = 1 << 31;

/// Special markers that can occupy a cell instead of a numeric tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    /// Doubles the running score when triggered.
    DoubleScore,
    /// Grants an extra move. Recognized, but the effect is not implemented.
    ExtraMove,
}

impl PowerUp {
    pub const ALL: [PowerUp; 2] = [PowerUp::DoubleScore, PowerUp::ExtraMove];

    /// One-letter symbol shown on the board.
    pub fn symbol(self) -> char {
        match self {
            PowerUp::DoubleScore => 'D',
            PowerUp::ExtraMove => 'E',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUp::DoubleScore => "double_score",
            PowerUp::ExtraMove => "extra_move",
        }
    }
}

impl fmt::Display for PowerUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    /// A numeric tile. Always a power of two, at least 2.
    Tile(u32),
    PowerUp(PowerUp),
}

impl Cell {
    /// Map a raw number to a cell: `0` is empty, powers of two `>= 2` are
    /// tiles, anything else is rejected.
    pub fn from_value(value: u32) -> Option<Cell> {
        match value {
            0 => Some(Cell::Empty),
            v if is_tile_value(v) => Some(Cell::Tile(v)),
            _ => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Numeric value of a tile, `None` for empty cells and markers.
    pub fn value(self) -> Option<u32> {
        match self {
            Cell::Tile(v) => Some(v),
            _ => None,
        }
    }

    /// Value of the tile `self` and `other` merge into, if they merge.
    ///
    /// Only two equal numeric tiles below [`MAX_TILE`] merge. Markers never
    /// do.
    pub fn merged_with(self, other: Cell) -> Option<u32> {
        match (self, other) {
            (Cell::Tile(a), Cell::Tile(b)) if a == b => a.checked_mul(2),
            _ => None,
        }
    }

    fn is_valid(self) -> bool {
        match self {
            Cell::Tile(v) => is_tile_value(v),
            _ => true,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.pad(""),
            Cell::Tile(v) => f.pad(&v.to_string()),
            Cell::PowerUp(p) => f.pad(&p.symbol().to_string()),
        }
    }
}

fn is_tile_value(v: u32) -> bool {
    v >= 2 && v.is_power_of_two()
}

/// An N×N board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_SIZE)
    }
}

impl Grid {
    /// An empty `size`×`size` grid.
    pub fn new(size: usize) -> Self {
        Grid {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Build a grid from rows of raw numbers (`0` = empty).
    ///
    /// ```rust
    /// use merge2048_core::{Cell, Grid};
    ///
    /// let grid = Grid::from_rows(&[[2, 2], [0, 4]]).unwrap();
    /// assert_eq!(grid.get(1, 1), Cell::Tile(4));
    /// assert!(Grid::from_rows(&[[3, 0], [0, 0]]).is_err());
    /// ```
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    size,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                let cell =
                    Cell::from_value(value).ok_or(GridError::InvalidTile { row, col, value })?;
                cells.push(cell);
            }
        }

        Ok(Grid { size, cells })
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.size + col] = cell;
    }

    /// Overwrite the cell at a flat row-major index.
    pub fn set_index(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.size;
        &self.cells[start..start + self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Flat indices of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// Largest numeric tile, 0 on a grid without tiles.
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().filter_map(|c| c.value()).max().unwrap_or(0)
    }

    /// Sum of all numeric tiles.
    pub fn tile_sum(&self) -> u64 {
        self.cells
            .iter()
            .filter_map(|c| c.value())
            .map(u64::from)
            .sum()
    }

    pub fn contains_tile(&self, value: u32) -> bool {
        self.cells.contains(&Cell::Tile(value))
    }

    /// Positions and kinds of every power-up marker on the board.
    pub fn power_ups(&self) -> Vec<(usize, PowerUp)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Cell::PowerUp(p) => Some((i, *p)),
                _ => None,
            })
            .collect()
    }

    /// Whether every cell is empty, a marker, or a power of two `>= 2`.
    pub fn is_valid(&self) -> bool {
        self.cells.len() == self.size * self.size && self.cells.iter().all(|c| c.is_valid())
    }

    /// The grid rotated 90° clockwise: `out[r][c] = in[n - 1 - c][r]`.
    pub fn rotate_cw(&self) -> Grid {
        let n = self.size;
        let mut out = Grid::new(n);
        for r in 0..n {
            for c in 0..n {
                out.cells[r * n + c] = self.cells[(n - 1 - c) * n + r];
            }
        }
        out
    }

    /// Rotate clockwise `turns` quarter turns.
    pub fn rotated(&self, turns: usize) -> Grid {
        let mut out = self.clone();
        for _ in 0..turns % 4 {
            out = out.rotate_cw();
        }
        out
    }

    /// The grid flipped left to right.
    pub fn mirror(&self) -> Grid {
        let mut out = self.clone();
        for row in out.cells.chunks_mut(self.size.max(1)) {
            row.reverse();
        }
        out
    }

    pub(crate) fn from_cells(size: usize, cells: Vec<Cell>) -> Grid {
        debug_assert_eq!(cells.len(), size * size);
        Grid { size, cells }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "------+".repeat(self.size));
        writeln!(f, "{}", border)?;
        for row in self.rows() {
            write!(f, "|")?;
            for cell in row {
                write!(f, "{:^6}|", cell)?;
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}
