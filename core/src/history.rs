//! Undo stack and move log.

use std::collections::VecDeque;

use serde::Serialize;

use crate::grid::Grid;
use crate::Direction;

/// A frozen (grid, score) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: u64,
}

/// Last-in-first-out stack of pre-move snapshots.
///
/// Unbounded by default. With a capacity, pushing onto a full stack drops
/// the oldest snapshot.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: VecDeque<Snapshot>,
    capacity: Option<usize>,
}

impl UndoStack {
    pub fn new() -> Self {
        UndoStack::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        UndoStack {
            entries: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn push(&mut self, grid: Grid, score: u64) {
        if let Some(cap) = self.capacity {
            if cap == 0 {
                return;
            }
            while self.entries.len() >= cap {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(Snapshot { grid, score });
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Restore the most recent snapshot, or hand back the current state when
/// there is nothing to undo.
pub fn undo(stack: &mut UndoStack, grid: Grid, score: u64) -> (Grid, u64) {
    match stack.pop() {
        Some(snapshot) => (snapshot.grid, snapshot.score),
        None => (grid, score),
    }
}

/// One committed move as recorded in the [`MoveLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedMove {
    pub direction: Direction,
    /// State after the move was committed.
    pub after: Snapshot,
}

/// Append-only record of committed moves. Never used for undo.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveLog {
    moves: Vec<LoggedMove>,
}

impl MoveLog {
    pub fn new() -> Self {
        MoveLog::default()
    }

    pub fn record(&mut self, direction: Direction, grid: Grid, score: u64) {
        self.moves.push(LoggedMove {
            direction,
            after: Snapshot { grid, score },
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoggedMove> {
        self.moves.iter()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last(&self) -> Option<&LoggedMove> {
        self.moves.last()
    }

    /// One human-readable line per move.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.moves.iter().enumerate().map(|(i, m)| {
            let rows: Vec<String> = m
                .after
                .grid
                .rows()
                .map(|row| {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|c| match c.value() {
                            Some(v) => v.to_string(),
                            None if c.is_empty() => "0".to_string(),
                            None => c.to_string(),
                        })
                        .collect();
                    format!("[{}]", cells.join(", "))
                })
                .collect();
            format!(
                "Move {}: {} - Board [{}], Score {}",
                i,
                m.direction,
                rows.join(", "),
                m.after.score
            )
        })
    }
}

impl<'a> IntoIterator for &'a MoveLog {
    type Item = &'a LoggedMove;
    type IntoIter = std::slice::Iter<'a, LoggedMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
