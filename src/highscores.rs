//! High score leaderboard
//!
//! Tracks the top 10 runs by score, persisted through `Storage`.

use serde::{Deserialize, Serialize};

use crate::persistence::{HIGH_SCORES_KEY, KeyValueStore, Storage};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Wave reached
    pub wave: u32,
    /// Unix timestamp (ms) when achieved
    #[serde(alias = "date")]
    pub timestamp: f64,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
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

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    ///
    /// Ties rank below existing entries with the same score.
    pub fn add_score(&mut self, score: u64, wave: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                wave,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("High score #{}: {} (wave {})", rank, score, wave);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard, starting fresh on a missing or bad entry
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        match storage.get_json::<HighScores>(HIGH_SCORES_KEY) {
            Ok(Some(mut scores)) => {
                // Stored lists may come from older builds
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => Self::new(),
            Err(err) => {
                log::warn!("Ignoring stored high scores: {}", err);
                Self::new()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, storage: &mut Storage<S>) -> crate::persistence::Result<()> {
        storage.set_json(HIGH_SCORES_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a timestamp relative to `now` (both Unix ms)
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_mins = (now - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        match diff_days.floor() as i64 {
            1 => "Yesterday".to_string(),
            days if days < 7 => format!("{} days ago", days),
            days => format!("{} weeks ago", days / 7),
        }
    } else if diff_hours >= 1.0 {
        match diff_hours.floor() as i64 {
            1 => "1 hour ago".to_string(),
            hours => format!("{} hours ago", hours),
        }
    } else if diff_mins >= 1.0 {
        match diff_mins.floor() as i64 {
            1 => "1 min ago".to_string(),
            mins => format!("{} mins ago", mins),
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn filled() -> HighScores {
        let mut scores = HighScores::new();
        for i in 1..=10u64 {
            scores.add_score(i * 100, i as u32, 0.0);
        }
        scores
    }

    #[test]
    fn test_sorted_descending_and_capped() {
        let mut scores = filled();
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1000));

        assert_eq!(scores.add_score(550, 6, 0.0), Some(6));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(200));
        assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_qualification() {
        let scores = filled();
        assert!(!scores.qualifies(0));
        assert!(!scores.qualifies(100));
        assert!(scores.qualifies(101));
        assert_eq!(scores.potential_rank(5000), Some(1));
        assert_eq!(scores.potential_rank(50), None);

        assert!(HighScores::new().qualifies(1));
        assert!(!HighScores::new().qualifies(0));
    }

    #[test]
    fn test_tie_ranks_below() {
        let mut scores = HighScores::new();
        scores.add_score(300, 3, 1.0);
        assert_eq!(scores.add_score(300, 4, 2.0), Some(2));
        assert_eq!(scores.entries[0].wave, 3);
    }

    #[test]
    fn test_save_load() {
        let mut storage = Storage::new(MemoryStore::new());
        let scores = filled();
        scores.save(&mut storage).unwrap();
        assert_eq!(HighScores::load(&storage).entries, scores.entries);
    }

    #[test]
    fn test_load_accepts_date_field() {
        let mut store = MemoryStore::new();
        store
            .set(
                "iron_golem_survival_high_scores",
                r#"{"entries":[{"score":10,"wave":1,"date":5.0},{"score":90,"wave":4,"date":6.0}]}"#,
            )
            .unwrap();
        let loaded = HighScores::load(&Storage::new(store));
        assert_eq!(loaded.top_score(), Some(90));
        assert_eq!(loaded.entries[1].timestamp, 5.0);
    }

    #[test]
    fn test_format_date() {
        let min = 60_000.0;
        assert_eq!(format_date(0.0, 30_000.0), "Just now");
        assert_eq!(format_date(0.0, min), "1 min ago");
        assert_eq!(format_date(0.0, 5.0 * min), "5 mins ago");
        assert_eq!(format_date(0.0, 60.0 * min), "1 hour ago");
        assert_eq!(format_date(0.0, 24.0 * 60.0 * min), "Yesterday");
        assert_eq!(format_date(0.0, 3.0 * 24.0 * 60.0 * min), "3 days ago");
        assert_eq!(format_date(0.0, 15.0 * 24.0 * 60.0 * min), "2 weeks ago");
    }
}
