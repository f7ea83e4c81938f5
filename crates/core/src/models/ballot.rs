//! Ballot and review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One vote: a voter picks one candidate for one position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    pub id: Uuid,
    pub room_id: Uuid,
    pub position_id: Uuid,
    pub candidate_id: Uuid,
    pub voter_id: Uuid,
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(room_id: Uuid, position_id: Uuid, candidate_id: Uuid, voter_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            position_id,
            candidate_id,
            voter_id,
            cast_at: Utc::now(),
        }
    }
}

/// Star ratings run 1 through 5 inclusive
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One star-rating review of a candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub room_id: Uuid,
    pub candidate_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Review {
    pub fn new(room_id: Uuid, candidate_id: Uuid, reviewer_id: Uuid, rating: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            candidate_id,
            reviewer_id,
            rating,
            comment: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn with_comment(mut self, comment: String) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn rating_in_range(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}
