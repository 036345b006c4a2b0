//! Greedy one-ply auto-player.
//!
//! Each direction is simulated through the move engine; the one with the
//! highest immediate merge score wins. There is no lookahead.

use crate::engine::{shift, MoveResult};
use crate::grid::Grid;
use crate::Direction;

/// Every legal move from `grid`, in [`Direction::ALL`] order.
pub fn candidates(grid: &Grid) -> impl Iterator<Item = (Direction, MoveResult)> + '_ {
    Direction::ALL
        .into_iter()
        .map(move |dir| (dir, shift(grid, dir)))
        .filter(|(_, result)| result.moved)
}

/// The legal move with the largest score gain.
///
/// Ties go to the earliest direction in `left, right, up, down` order.
/// Returns `None` when no direction changes the grid.
pub fn best_move(grid: &Grid) -> Option<Direction> {
    let mut best: Option<(Direction, u64)> = None;
    for (dir, result) in candidates(grid) {
        match best {
            Some((_, score)) if result.gained <= score => {}
            _ => best = Some((dir, result.gained)),
        }
    }
    best.map(|(dir, _)| dir)
}
