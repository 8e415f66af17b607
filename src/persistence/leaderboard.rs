//! Local leaderboard
//!
//! Top 10 scores, sorted descending. Ties keep the earlier entry ahead.

use serde::{Deserialize, Serialize};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    pub identity: String,
    /// Deepest layer reached in the run
    pub deepest_layer: u8,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies. Returns the rank achieved.
    pub fn add(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            score,
            identity: "anon".to_string(),
            deepest_layer: 1,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_sorted_descending() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(entry(100)), Some(1));
        assert_eq!(board.add(entry(300)), Some(1));
        assert_eq!(board.add(entry(200)), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(entry(0)), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_full_board_keeps_top_ten() {
        let mut board = Leaderboard::new();
        for s in 1..=10 {
            board.add(entry(s * 10));
        }
        assert!(!board.qualifies(10));
        assert_eq!(board.potential_rank(55), Some(6));
        assert_eq!(board.add(entry(55)), Some(6));
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_tie_ranks_after_existing() {
        let mut board = Leaderboard::new();
        board.add(entry(100));
        assert_eq!(board.add(entry(100)), Some(2));
    }
}
