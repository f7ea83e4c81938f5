//! Room model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of event a room hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    /// Ballot-based election: one vote per voter per position
    Election,
    /// Star-rating review: 1-5 rating per reviewer per candidate
    Review,
}

impl RoomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Election => "election",
            RoomKind::Review => "review",
        }
    }
}

/// Room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    /// Being set up; positions and candidates still editable
    Draft,
    /// Accepting ballots/reviews through share links
    Open,
    /// Closed to submissions; results and conflicts visible to admins
    Closed,
    /// Results snapshotted, working records destroyed
    Finalized,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Draft => "draft",
            RoomStatus::Open => "open",
            RoomStatus::Closed => "closed",
            RoomStatus::Finalized => "finalized",
        }
    }

    /// Whether participants may still submit ballots or reviews
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, RoomStatus::Open)
    }
}

/// A single election or review event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: RoomKind,
    pub status: RoomStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(title: String, description: Option<String>, kind: RoomKind, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            kind,
            status: RoomStatus::Draft,
            created_by,
            created_at: Utc::now(),
            finalized_at: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == RoomStatus::Finalized
    }
}
