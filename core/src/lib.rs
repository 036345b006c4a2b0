//! # 2048 Board-Transition Engine
//!
//! Pure game logic for 2048: sliding and merging tiles, detecting the end of
//! a game, spawning new tiles from a seedable PRNG, a greedy auto-player,
//! undo, and score tracking. Rendering and input are left to the caller.
//!
//! ## Example
//!
//! ```rust
//! use merge2048_core::{Direction, Session};
//!
//! let mut session = Session::with_seed(42);
//! let result = session.step(Direction::Left);
//! println!("Score: {}, Moved: {}", session.score(), result.moved);
//! if let Some(dir) = session.best_move() {
//!     session.step(dir);
//! }
//! session.undo();
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub mod achievements;
pub mod engine;
pub mod error;
pub mod grid;
pub mod history;
pub mod scores;
pub mod session;
pub mod solver;
pub mod spawn;

pub use achievements::{Achievement, Achievements};
pub use engine::{apply_move, has_move, is_game_over, shift, MoveResult};
pub use error::{GridError, ParseDirectionError};
pub use grid::{Cell, Grid, PowerUp, MAX_TILE};
pub use history::{undo, LoggedMove, MoveLog, Snapshot, UndoStack};
pub use scores::{HighScores, Leaderboard, TOP_K};
pub use session::{new_game, Session, SessionConfig, StepResult};
pub use solver::best_move;
pub use spawn::TileSpawner;

/// The four possible move directions in 2048.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions in evaluation order. The auto-player breaks ties by
    /// this order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
