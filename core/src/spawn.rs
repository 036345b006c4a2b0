//! Random tile placement.

use log::trace;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::grid::{Cell, Grid, PowerUp};

/// Probability threshold above which a spawned tile is a 4 instead of a 2.
const FOUR_THRESHOLD: f64 = 0.9;

/// Places new tiles into empty cells using a seedable PRNG, so that a game
/// replays identically from the same seed.
#[derive(Clone, Debug)]
pub struct TileSpawner {
    rng: SmallRng,
}

impl TileSpawner {
    pub fn new(seed: u64) -> Self {
        TileSpawner {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        TileSpawner {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Draw a value for a fresh tile: 2 with probability 0.9, otherwise 4.
    fn draw_value(&mut self) -> u32 {
        if self.rng.gen::<f64>() > FOUR_THRESHOLD {
            4
        } else {
            2
        }
    }

    fn pick_empty(&mut self, grid: &Grid) -> Option<usize> {
        let empty = grid.empty_cells();
        if empty.is_empty() {
            return None;
        }
        Some(empty[self.rng.gen_range(0..empty.len())])
    }

    /// Put a 2 or a 4 into a uniformly chosen empty cell.
    ///
    /// Returns the flat index that was filled, or `None` (leaving the grid
    /// alone) when the grid is full.
    pub fn spawn(&mut self, grid: &mut Grid) -> Option<usize> {
        let index = self.pick_empty(grid)?;
        let value = self.draw_value();
        grid.set_index(index, Cell::Tile(value));
        trace!("spawned {} at cell {}", value, index);
        Some(index)
    }

    /// Put a power-up marker, chosen uniformly, into a random empty cell.
    pub fn spawn_power_up(&mut self, grid: &mut Grid) -> Option<(usize, PowerUp)> {
        let index = self.pick_empty(grid)?;
        let power_up = PowerUp::ALL[self.rng.gen_range(0..PowerUp::ALL.len())];
        grid.set_index(index, Cell::PowerUp(power_up));
        trace!("spawned power-up {} at cell {}", power_up, index);
        Some((index, power_up))
    }

    /// Bernoulli draw used to decide whether the next spawn is a power-up.
    pub(crate) fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.gen::<f64>() < p
    }
}
