//! Bounded top-K score lists.
//!
//! [`HighScores`] keeps the K best scores ever seen. [`Leaderboard`] keeps
//! the K most recent scores (oldest evicted first) and ranks them for
//! display.
//!
//! The leaderboard is deliberately not a second top-K list and does not
//! converge to the same set as [`HighScores`]: a best score drops off it
//! once K newer games have finished, however low they scored.

use std::collections::VecDeque;

/// Number of entries kept by both lists.
pub const TOP_K: usize = 5;

/// Best scores, sorted descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    scores: Vec<u64>,
}

impl HighScores {
    pub fn new() -> Self {
        HighScores::default()
    }

    /// Insert a final score: append, sort descending, keep the top K.
    pub fn record(&mut self, score: u64) {
        self.scores.push(score);
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(TOP_K);
    }

    pub fn scores(&self) -> &[u64] {
        &self.scores
    }

    pub fn best(&self) -> Option<u64> {
        self.scores.first().copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Most recent scores in arrival order, bounded to K with FIFO eviction.
///
/// Eviction ignores the value, so the best score is not protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    recent: VecDeque<u64>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Leaderboard {
            recent: VecDeque::with_capacity(TOP_K),
        }
    }
}

impl Leaderboard {
    pub fn new() -> Self {
        Leaderboard::default()
    }

    /// Append a final score, evicting the oldest entry once full.
    pub fn record(&mut self, score: u64) {
        if self.recent.len() == TOP_K {
            self.recent.pop_front();
        }
        self.recent.push_back(score);
    }

    /// Entries sorted descending, for display.
    pub fn ranked(&self) -> Vec<u64> {
        let mut ranked: Vec<u64> = self.recent.iter().copied().collect();
        ranked.sort_unstable_by(|a, b| b.cmp(a));
        ranked
    }

    /// Entries in arrival order, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = u64> + '_ {
        self.recent.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}
