//! Milestones unlocked during play.

use std::collections::BTreeSet;
use std::fmt;

use log::info;
use serde::Serialize;

use crate::grid::Grid;

const TARGET_TILE: u32 = 2048;
const TARGET_SCORE: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Achievement {
    /// A 2048 tile appeared on the board.
    Tile2048,
    /// The running score reached 10 000.
    Score10k,
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Achievement::Tile2048 => f.write_str("2048 Tile Achieved"),
            Achievement::Score10k => f.write_str("Score 10,000+"),
        }
    }
}

/// Set of unlocked milestones. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Achievements {
    unlocked: BTreeSet<Achievement>,
}

impl Achievements {
    pub fn new() -> Self {
        Achievements::default()
    }

    /// Evaluate the milestones against the current state and return the
    /// ones unlocked by this call.
    pub fn check(&mut self, grid: &Grid, score: u64) -> Vec<Achievement> {
        let mut fresh = Vec::new();
        if grid.contains_tile(TARGET_TILE) && self.unlocked.insert(Achievement::Tile2048) {
            fresh.push(Achievement::Tile2048);
        }
        if score >= TARGET_SCORE && self.unlocked.insert(Achievement::Score10k) {
            fresh.push(Achievement::Score10k);
        }
        for a in &fresh {
            info!("achievement unlocked: {}", a);
        }
        fresh
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn iter(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }
}
