//! A single-player game session tying the engine, spawner and trackers
//! together.

use std::fmt;

use log::{debug, info};

use crate::achievements::{Achievement, Achievements};
use crate::engine::{self, apply_move};
use crate::grid::{Cell, Grid, PowerUp};
use crate::history::{self, MoveLog, UndoStack};
use crate::scores::{HighScores, Leaderboard};
use crate::solver;
use crate::spawn::TileSpawner;
use crate::Direction;

/// Knobs for a [`Session`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionConfig {
    /// Seed for the tile spawner. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Maximum undo depth. `None` keeps every snapshot.
    pub undo_limit: Option<usize>,
    /// Probability that a spawn places a power-up marker instead of a tile.
    pub power_up_chance: f64,
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = Some(limit);
        self
    }

    pub fn with_power_up_chance(mut self, chance: f64) -> Self {
        self.power_up_chance = chance.clamp(0.0, 1.0);
        self
    }
}

/// Result of executing a step (move) in the game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub moved: bool,
    /// Points earned from merges in this move.
    pub gained: u64,
    /// Power-up markers that fired on this move.
    pub power_ups: Vec<PowerUp>,
    /// Achievements unlocked by this move.
    pub unlocked: Vec<Achievement>,
    /// Whether the game is over (no legal moves remaining).
    pub game_over: bool,
}

/// A fresh 4×4 grid holding two spawned tiles.
pub fn new_game(spawner: &mut TileSpawner) -> Grid {
    let mut grid = Grid::default();
    spawner.spawn(&mut grid);
    spawner.spawn(&mut grid);
    grid
}

/// The live game: current grid and score plus everything that outlives a
/// single game (high scores, leaderboard, achievements, move log).
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    score: u64,
    over: bool,
    spawner: TileSpawner,
    undo: UndoStack,
    log: MoveLog,
    high_scores: HighScores,
    leaderboard: Leaderboard,
    achievements: Achievements,
    config: SessionConfig,
}

impl Session {
    /// Create a session and start its first game.
    pub fn new(config: SessionConfig) -> Self {
        let spawner = match config.seed {
            Some(seed) => TileSpawner::new(seed),
            None => TileSpawner::from_entropy(),
        };
        let undo = match config.undo_limit {
            Some(limit) => UndoStack::with_capacity(limit),
            None => UndoStack::new(),
        };
        let mut session = Session {
            grid: Grid::default(),
            score: 0,
            over: false,
            spawner,
            undo,
            log: MoveLog::new(),
            high_scores: HighScores::new(),
            leaderboard: Leaderboard::new(),
            achievements: Achievements::new(),
            config,
        };
        session.new_game();
        session
    }

    pub fn with_seed(seed: u64) -> Self {
        Session::new(SessionConfig::default().with_seed(seed))
    }

    /// Replace the grid and score with a new game and clear the undo stack.
    /// Scores, achievements and the move log are kept.
    pub fn new_game(&mut self) -> &Grid {
        self.grid = new_game(&mut self.spawner);
        self.score = 0;
        self.undo.clear();
        self.over = engine::is_game_over(&self.grid);
        info!("new game started");
        &self.grid
    }

    /// Execute a move in the given direction.
    ///
    /// A move that leaves the grid unchanged commits nothing: no snapshot,
    /// no spawn, no log entry.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        if self.over {
            return StepResult {
                game_over: true,
                ..StepResult::default()
            };
        }

        let (next, score, moved) = apply_move(&self.grid, self.score, direction);
        if !moved {
            return StepResult::default();
        }
        let gained = score - self.score;

        self.undo.push(self.grid.clone(), self.score);
        self.grid = next;
        self.score = score;

        let power_ups = self.resolve_power_ups();
        self.spawn_next();
        assert!(
            self.grid.is_valid(),
            "grid invariant violated after {}:\n{}",
            direction,
            self.grid
        );

        self.log.record(direction, self.grid.clone(), self.score);
        let unlocked = self.achievements.check(&self.grid, self.score);
        debug!(
            "moved {} (+{}), score {}, {} empty",
            direction,
            gained,
            self.score,
            self.grid.empty_count()
        );

        self.over = engine::is_game_over(&self.grid);
        if self.over {
            info!("game over with score {}", self.score);
            self.record_score(self.score);
        }

        StepResult {
            moved: true,
            gained,
            power_ups,
            unlocked,
            game_over: self.over,
        }
    }

    /// Let the greedy auto-player pick and play a move.
    pub fn ai_step(&mut self) -> Option<(Direction, StepResult)> {
        if self.over {
            return None;
        }
        let direction = solver::best_move(&self.grid)?;
        Some((direction, self.step(direction)))
    }

    /// Restore the state before the last committed move. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.undo.is_empty() {
            return false;
        }
        let current = std::mem::take(&mut self.grid);
        let (grid, score) = history::undo(&mut self.undo, current, self.score);
        self.grid = grid;
        self.score = score;
        self.over = engine::is_game_over(&self.grid);
        debug!("undo, score back to {}", self.score);
        true
    }

    /// Push a final score into the high scores and leaderboard and run the
    /// achievement checks against it.
    pub fn record_score(&mut self, final_score: u64) {
        self.high_scores.record(final_score);
        self.leaderboard.record(final_score);
        self.achievements.check(&self.grid, final_score);
    }

    pub fn best_move(&self) -> Option<Direction> {
        solver::best_move(&self.grid)
    }

    /// Which directions would change the board, in [`Direction::ALL`] order.
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|dir| engine::shift(&self.grid, dir).moved)
    }

    pub fn is_game_over(&self) -> bool {
        self.over
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_tile(&self) -> u32 {
        self.grid.max_tile()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn move_log(&self) -> &MoveLog {
        &self.log
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    /// Fire and clear every marker on the board.
    fn resolve_power_ups(&mut self) -> Vec<PowerUp> {
        let fired = self.grid.power_ups();
        for &(index, power_up) in &fired {
            match power_up {
                PowerUp::DoubleScore => self.score = self.score.saturating_mul(2),
                // No effect is defined for this marker; it is only reported.
                PowerUp::ExtraMove => {}
            }
            self.grid.set_index(index, Cell::Empty);
            debug!("power-up {} fired", power_up);
        }
        fired.into_iter().map(|(_, p)| p).collect()
    }

    fn spawn_next(&mut self) {
        if self.spawner.chance(self.config.power_up_chance) {
            self.spawner.spawn_power_up(&mut self.grid);
        } else {
            self.spawner.spawn(&mut self.grid);
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        write!(f, "{}", self.grid)
    }
}
