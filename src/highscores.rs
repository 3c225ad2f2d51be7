//! Local scoreboard: the best final scores, highest first

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistError, Store};

/// Entries kept on the scoreboard
pub const MAX_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    /// Unix timestamp (ms) when the match ended
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub entries: Vec<ScoreEntry>,
}

impl Scoreboard {
    const STORAGE_KEY: &'static str = "scoreboard";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert a score; returns the 1-based rank it landed on
    ///
    /// Equal scores rank below the ones already recorded.
    pub fn add_score(&mut self, score: u32, timestamp: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let entry = ScoreEntry { score, timestamp };
        let index = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from storage, dropping anything out of order or past the cap
    pub fn load(store: &Store) -> Self {
        let mut board: Self = store.load_or_default(Self::STORAGE_KEY);
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(MAX_ENTRIES);
        log::info!("Scoreboard has {} entries", board.entries.len());
        board
    }

    pub fn save(&self, store: &Store) -> Result<(), PersistError> {
        store.save(Self::STORAGE_KEY, self)
    }
}

/// Relative age of a score, e.g. "3 mins ago"
pub fn format_age(timestamp: u64, now: u64) -> String {
    let secs = now.saturating_sub(timestamp) / 1000;
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;
    match (days, hours, mins) {
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d > 1 => format!("{d} days ago"),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h > 1 => format!("{h} hours ago"),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, m) if m > 1 => format!("{m} mins ago"),
        _ => "Just now".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_never_qualifies() {
        let board = Scoreboard::new();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
    }

    #[test]
    fn test_add_keeps_top_five_descending() {
        let mut board = Scoreboard::new();
        for (i, score) in [50, 10, 90, 30, 70, 20].into_iter().enumerate() {
            board.add_score(score, i as u64);
        }
        let scores: Vec<u32> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 70, 50, 30, 20]);
        assert_eq!(board.top_score(), Some(90));
        assert!(!board.qualifies(20));
        assert_eq!(board.add_score(15, 9), None);
    }

    #[test]
    fn test_rank_returned() {
        let mut board = Scoreboard::new();
        assert_eq!(board.add_score(100, 0), Some(1));
        assert_eq!(board.add_score(200, 0), Some(1));
        assert_eq!(board.add_score(150, 0), Some(2));
        // Ties go below the existing entry
        assert_eq!(board.add_score(150, 1), Some(3));
        assert_eq!(board.entries[1].timestamp, 0);
    }

    #[test]
    fn test_format_age() {
        let min = 60_000;
        assert_eq!(format_age(0, 30_000), "Just now");
        assert_eq!(format_age(0, min), "1 min ago");
        assert_eq!(format_age(0, 5 * min), "5 mins ago");
        assert_eq!(format_age(0, 60 * min), "1 hour ago");
        assert_eq!(format_age(0, 26 * 60 * min), "Yesterday");
        assert_eq!(format_age(0, 3 * 24 * 60 * min), "3 days ago");
        // Clock skew
        assert_eq!(format_age(10, 0), "Just now");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load() {
        let store = crate::persistence::temp_store("scoreboard");
        let mut board = Scoreboard::new();
        board.add_score(42, 1000);
        board.add_score(7, 2000);
        board.save(&store).unwrap();
        assert_eq!(Scoreboard::load(&store), board);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_repairs_order() {
        let store = crate::persistence::temp_store("scoreboard-repair");
        let messy = Scoreboard {
            entries: (1..=7)
                .map(|score| ScoreEntry {
                    score,
                    timestamp: 0,
                })
                .collect(),
        };
        store.save("scoreboard", &messy).unwrap();
        let board = Scoreboard::load(&store);
        let scores: Vec<u32> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![7, 6, 5, 4, 3]);
    }

    proptest! {
        #[test]
        fn prop_board_stays_sorted_and_capped(scores in prop::collection::vec(0u32..500, 0..40)) {
            let mut board = Scoreboard::new();
            for s in &scores {
                board.add_score(*s, 0);
            }
            prop_assert!(board.entries.len() <= MAX_ENTRIES);
            prop_assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
            let mut best: Vec<u32> = scores.iter().copied().filter(|s| *s > 0).collect();
            best.sort_unstable_by(|a, b| b.cmp(a));
            best.truncate(MAX_ENTRIES);
            let kept: Vec<u32> = board.entries.iter().map(|e| e.score).collect();
            prop_assert_eq!(kept, best);
        }
    }
}
