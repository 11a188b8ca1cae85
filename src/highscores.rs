//! High score and leaderboard persistence
//!
//! The leaderboard keeps one entry per player (their best run), sorted
//! descending by score.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError, keys, load_record, save_record};
use crate::platform::Millis;
use crate::sim::Difficulty;

/// Maximum number of players kept on the board
pub const MAX_LEADERBOARD_ENTRIES: usize = 50;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u32,
    /// Wall-clock time (ms since the Unix epoch) of the run
    #[serde(default)]
    pub date: u64,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from raw entries, applying dedup and ordering
    pub fn from_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let mut board = Self::new();
        for entry in entries {
            board.insert(entry);
        }
        board
    }

    /// Record a finished run
    ///
    /// Returns the player's 1-indexed rank after the insert, or None when
    /// the name is blank, the score is zero, or the player already has an
    /// equal or better entry.
    pub fn record(
        &mut self,
        player_name: &str,
        score: u32,
        date: u64,
        difficulty: Difficulty,
    ) -> Option<usize> {
        let player_name = player_name.trim();
        if player_name.is_empty() || score == 0 {
            return None;
        }
        let improved = self.insert(LeaderboardEntry {
            player_name: player_name.to_string(),
            score,
            date,
            difficulty,
        });
        if improved { self.rank_of(player_name) } else { None }
    }

    fn insert(&mut self, entry: LeaderboardEntry) -> bool {
        if let Some(i) = self
            .entries
            .iter()
            .position(|e| e.player_name == entry.player_name)
        {
            if self.entries[i].score >= entry.score {
                return false;
            }
            self.entries.remove(i);
        }

        // Ties keep the earlier entry ahead
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        true
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// 1-indexed rank of a player's best entry
    pub fn rank_of(&self, player_name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.player_name == player_name)
            .map(|i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from storage, re-applying dedup so older append-only records
    /// still come back ordered
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw: Vec<LeaderboardEntry> = load_record(store, keys::LEADERBOARD);
        let board = Self::from_entries(raw);
        log::debug!("Loaded leaderboard ({} entries)", board.len());
        board
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_record(store, keys::LEADERBOARD, &self.entries)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}

pub fn load_high_score(store: &dyn KeyValueStore) -> u32 {
    load_record(store, keys::HIGH_SCORE)
}

pub fn save_high_score(store: &mut dyn KeyValueStore, score: u32) -> Result<(), StoreError> {
    save_record(store, keys::HIGH_SCORE, &score)
}

pub fn load_player_name(store: &dyn KeyValueStore) -> String {
    load_record(store, keys::PLAYER_NAME)
}

pub fn save_player_name(store: &mut dyn KeyValueStore, name: &str) -> Result<(), StoreError> {
    save_record(store, keys::PLAYER_NAME, name)
}

/// Format the age of an entry relative to `now` (both wall-clock ms)
pub fn format_age(date: u64, now: u64) -> String {
    let diff: Millis = now.saturating_sub(date);
    let mins = diff / 60_000;
    let hours = mins / 60;
    let days = hours / 24;

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
