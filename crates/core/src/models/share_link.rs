//! Share link model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shareable participation link for a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: Uuid,
    pub room_id: Uuid,
    pub token: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<u32>,
    pub use_count: u32,
    pub is_revoked: bool,
}

impl ShareLink {
    pub fn new(room_id: Uuid, created_by: Uuid, token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            token,
            created_by,
            created_at: Utc::now(),
            expires_at: None,
            max_uses: None,
            use_count: 0,
            is_revoked: false,
        }
    }

    pub fn with_expiry(mut self, hours: i64) -> Self {
        self.expires_at = Some(Utc::now() + chrono::Duration::hours(hours));
        self
    }

    pub fn with_max_uses(mut self, max: u32) -> Self {
        self.max_uses = Some(max);
        self
    }

    pub fn is_valid(&self) -> bool {
        if self.is_revoked {
            return false;
        }

        if let Some(expires) = self.expires_at {
            if Utc::now() > expires {
                return false;
            }
        }

        if let Some(max) = self.max_uses {
            if self.use_count >= max {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_link_is_valid() {
        let link = ShareLink::new(Uuid::new_v4(), Uuid::new_v4(), "tok".to_string());
        assert!(link.is_valid());
    }

    #[test]
    fn test_revoked_link_invalid() {
        let mut link = ShareLink::new(Uuid::new_v4(), Uuid::new_v4(), "tok".to_string());
        link.is_revoked = true;
        assert!(!link.is_valid());
    }

    #[test]
    fn test_used_up_link_invalid() {
        let mut link =
            ShareLink::new(Uuid::new_v4(), Uuid::new_v4(), "tok".to_string()).with_max_uses(2);
        link.use_count = 2;
        assert!(!link.is_valid());
    }

    #[test]
    fn test_expired_link_invalid() {
        let mut link = ShareLink::new(Uuid::new_v4(), Uuid::new_v4(), "tok".to_string());
        link.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        assert!(!link.is_valid());
    }
}
