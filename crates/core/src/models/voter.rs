//! Voter model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant registered in a room through a share link.
///
/// Voters are working records: they are destroyed when the room is
/// finalized, which is what anonymizes the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    pub id: Uuid,
    pub room_id: Uuid,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
    pub has_submitted: bool,
}

impl Voter {
    pub fn new(room_id: Uuid, display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            display_name,
            joined_at: Utc::now(),
            has_submitted: false,
        }
    }
}
