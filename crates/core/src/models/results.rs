//! Finalized results snapshot
//!
//! The frozen copy of a room's tallies written at finalize time. Once this
//! exists the ballots, reviews and voters it was computed from are gone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable results summary stored on the room row as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedResults {
    pub room_id: Uuid,
    pub finalized_at: DateTime<Utc>,
    pub total_ballots: u64,
    pub positions: Vec<FinalPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPosition {
    pub position_id: Uuid,
    pub title: String,
    /// Winner name, if the position produced one
    pub winner: Option<String>,
    pub forfeited_by: Option<String>,
    pub candidates: Vec<FinalCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalCandidate {
    pub name: String,
    pub vote_count: u64,
    pub average_rating: Option<f64>,
    pub is_official_winner: bool,
}

impl FinalizedResults {
    /// Winner names keyed by position title, for term publishing
    pub fn winners(&self) -> Vec<(&str, &str)> {
        self.positions
            .iter()
            .filter_map(|p| p.winner.as_deref().map(|w| (p.title.as_str(), w)))
            .collect()
    }
}
