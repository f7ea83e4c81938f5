//! Admin preferences persistence
//!
//! Stores per-admin preferences like the last opened room and the
//! notification toggle. Kept as an explicit store handed around by the
//! service layer, never as ambient global state.

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::Result;

/// Admin preferences
#[derive(Debug, Clone)]
pub struct AdminPreferences {
    pub admin_id: Uuid,
    pub last_room_id: Option<Uuid>,
    pub notifications_enabled: bool,
}

/// Preferences store
pub struct PreferencesStore<'a> {
    conn: &'a Connection,
}

impl<'a> PreferencesStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Save admin preferences
    pub fn save(&self, prefs: &AdminPreferences) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO admin_preferences (admin_id, last_room_id, notifications_enabled, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                prefs.admin_id.to_string(),
                prefs.last_room_id.map(|id| id.to_string()),
                prefs.notifications_enabled as i32,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load admin preferences
    pub fn load(&self, admin_id: Uuid) -> Result<Option<AdminPreferences>> {
        let result = self.conn.query_row(
            "SELECT last_room_id, notifications_enabled FROM admin_preferences WHERE admin_id = ?1",
            params![admin_id.to_string()],
            |row| {
                let last_room: Option<String> = row.get(0)?;
                let notifications: i32 = row.get(1)?;
                Ok((last_room, notifications))
            },
        );

        match result {
            Ok((last_room, notifications)) => Ok(Some(AdminPreferences {
                admin_id,
                last_room_id: last_room.and_then(|s| Uuid::parse_str(&s).ok()),
                notifications_enabled: notifications != 0,
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set last opened room for an admin
    pub fn set_last_room(&self, admin_id: Uuid, room_id: Uuid) -> Result<()> {
        let prefs = self.load(admin_id)?.unwrap_or(AdminPreferences {
            admin_id,
            last_room_id: None,
            notifications_enabled: true,
        });
        self.save(&AdminPreferences {
            last_room_id: Some(room_id),
            ..prefs
        })
    }

    /// Get last opened room for an admin
    pub fn get_last_room(&self, admin_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self.load(admin_id)?.and_then(|p| p.last_room_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Admin;
    use crate::storage::Database;

    fn create_test_admin(db: &Database) -> Uuid {
        let admin = Admin::new("chair".to_string(), "hash".to_string());
        let id = admin.id;
        db.admins().create(&admin).unwrap();
        id
    }

    #[test]
    fn test_preferences_save_load() {
        let db = Database::open_in_memory().unwrap();
        let admin_id = create_test_admin(&db);
        let room_id = Uuid::new_v4(); // room does not need to exist

        db.preferences().set_last_room(admin_id, room_id).unwrap();

        let last = db.preferences().get_last_room(admin_id).unwrap();
        assert_eq!(last, Some(room_id));

        let prefs = db.preferences().load(admin_id).unwrap().unwrap();
        assert!(prefs.notifications_enabled);
    }

    #[test]
    fn test_preferences_not_found() {
        let db = Database::open_in_memory().unwrap();

        let result = db.preferences().get_last_room(Uuid::new_v4()).unwrap();
        assert!(result.is_none());
    }
}
