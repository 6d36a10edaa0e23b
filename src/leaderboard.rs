//! High score leaderboard
//!
//! A bounded top-10 table, serialized as a flat JSON list. Storage itself
//! is the host's problem ([`ScoreStore`]); this module owns ordering,
//! eviction, and recovery from corrupted data.

use serde::{Deserialize, Serialize};

/// Maximum number of scores to keep
pub const MAX_ENTRIES: usize = 10;

/// Name recorded when the player leaves the name field blank
pub const ANONYMOUS: &str = "Anonymous";

/// A single leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
    /// SLO target the score was earned under
    pub slo_name: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp_ms: u64,
}

/// Host-side storage for the serialized leaderboard.
///
/// Failures degrade to "no leaderboard": `load` returning `None` and `save`
/// silently dropping the write are both acceptable outcomes.
pub trait ScoreStore {
    fn load(&self) -> Option<String>;
    fn save(&self, json: &str);
}

/// The score table, ordered descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create an empty leaderboard
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Deserialize a leaderboard. Malformed data is treated as an empty
    /// table, never an error.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Leaderboard>(json) {
            Ok(board) => board,
            Err(err) => {
                log::warn!("discarding corrupted leaderboard data: {err}");
                Self::new()
            }
        }
    }

    /// Serialize for the [`ScoreStore`]
    pub fn to_json(&self) -> String {
        // Vec<LeaderboardEntry> of flat records cannot fail to serialize
        serde_json::to_string(self).unwrap_or_else(|_| "{\"entries\":[]}".to_string())
    }

    /// Load from a store, recovering from missing or corrupted data
    pub fn load(store: &dyn ScoreStore) -> Self {
        match store.load() {
            Some(json) => {
                let board = Self::from_json(&json);
                log::info!("loaded {} leaderboard entries", board.entries.len());
                board
            }
            None => {
                log::info!("no leaderboard found, starting fresh");
                Self::new()
            }
        }
    }

    /// Persist to a store
    pub fn save(&self, store: &dyn ScoreStore) {
        store.save(&self.to_json());
        log::info!("leaderboard saved ({} entries)", self.entries.len());
    }

    /// Check whether a score would make the table
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// The rank a score would achieve (1-indexed, None if it wouldn't make
    /// the table)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a score. Inserts in descending order, evicts past the top 10.
    /// A blank name becomes [`ANONYMOUS`]. Returns the rank achieved
    /// (1-indexed) or None if the score didn't make the table.
    pub fn submit(
        &mut self,
        player_name: &str,
        score: u64,
        slo_name: &str,
        timestamp_ms: u64,
    ) -> Option<usize> {
        let player_name = match player_name.trim() {
            "" => ANONYMOUS.to_string(),
            trimmed => trimmed.to_string(),
        };
        let entry = LeaderboardEntry {
            player_name,
            score,
            slo_name: slo_name.to_string(),
            timestamp_ms,
        };

        // Insertion point: first strictly-lower score keeps ties in
        // submission order
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        if rank > MAX_ENTRIES {
            return None;
        }
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The top score, if any
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
