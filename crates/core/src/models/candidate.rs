//! Candidate model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate for one position.
///
/// Candidates are matched across positions by `name`, not by id: two
/// records with the same name in different positions are treated as the
/// same person when detecting multi-position wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub position_id: Uuid,
    pub name: String,
    pub ord: u32,
    pub is_official_winner: bool,
}

impl Candidate {
    pub fn new(position_id: Uuid, name: String, ord: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            position_id,
            name,
            ord,
            is_official_winner: false,
        }
    }
}
