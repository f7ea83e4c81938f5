//! Leadership term models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A leadership term shown on the public homepage.
///
/// Exactly one term is current at a time; older terms are kept as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: Uuid,
    pub label: String,
    pub started_at: DateTime<Utc>,
    pub is_current: bool,
}

impl Term {
    pub fn new(label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            started_at: Utc::now(),
            is_current: true,
        }
    }
}

/// One leadership seat within a term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermEntry {
    pub id: Uuid,
    pub term_id: Uuid,
    /// Room whose results produced this entry; republishing that room
    /// replaces its entries rather than stacking duplicates
    pub room_id: Uuid,
    pub position_title: String,
    pub holder_name: String,
    pub published_at: DateTime<Utc>,
}

impl TermEntry {
    pub fn new(term_id: Uuid, room_id: Uuid, position_title: String, holder_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            term_id,
            room_id,
            position_title,
            holder_name,
            published_at: Utc::now(),
        }
    }
}
