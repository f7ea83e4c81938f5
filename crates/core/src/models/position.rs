//! Position model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role being voted on or reviewed within a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub room_id: Uuid,
    pub title: String,
    /// Insertion order; conflict iteration follows this, not hash order
    pub ord: u32,
    /// Set once a tie or multi-win has been resolved for this position
    pub official_winner_id: Option<Uuid>,
    /// Name of a candidate whose win here was voided in favor of another
    /// position. The record stays; the name just stops counting as a winner.
    pub forfeited_by_candidate_name: Option<String>,
}

impl Position {
    pub fn new(room_id: Uuid, title: String, ord: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            title,
            ord,
            official_winner_id: None,
            forfeited_by_candidate_name: None,
        }
    }

    /// A position with a designated official winner no longer enters
    /// conflict detection.
    pub fn is_resolved(&self) -> bool {
        self.official_winner_id.is_some()
    }
}
