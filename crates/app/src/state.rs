//! Application state management

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use caucus_core::{Database, Error, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use uuid::Uuid;

use crate::settings::Settings;

/// Ephemeral in-app notification (not persisted)
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub room_id: Option<Uuid>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Main application state
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub settings: Settings,
    pub current_admin_id: Arc<Mutex<Option<Uuid>>>,
    pub current_session_id: Arc<Mutex<Option<Uuid>>>,
    pub current_room_id: Arc<Mutex<Option<Uuid>>>,
    /// Ephemeral notifications (room opened, finalized, published)
    pub notifications: Arc<Mutex<Vec<Notification>>>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let db_path = Self::data_path()?.join("caucus.db");

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let settings = Settings::load(Self::config_path()?.join("config.toml"))
            .unwrap_or_default();
        let db = Database::open(&db_path)?;

        Ok(Self::with_database(db, settings))
    }

    /// Build state around an existing database handle (used by tests)
    pub fn with_database(db: Database, settings: Settings) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            settings,
            current_admin_id: Arc::new(Mutex::new(None)),
            current_session_id: Arc::new(Mutex::new(None)),
            current_room_id: Arc::new(Mutex::new(None)),
            notifications: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "caucus", "caucus").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })
    }

    fn data_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().to_path_buf())
    }

    pub fn set_current_admin(&self, admin_id: Option<Uuid>) {
        *self.current_admin_id.lock().unwrap() = admin_id;
    }

    pub fn set_current_session(&self, session_id: Option<Uuid>) {
        *self.current_session_id.lock().unwrap() = session_id;
    }

    pub fn set_current_room(&self, room_id: Option<Uuid>) {
        *self.current_room_id.lock().unwrap() = room_id;
    }

    pub fn current_admin_id(&self) -> Option<Uuid> {
        *self.current_admin_id.lock().unwrap()
    }

    pub fn current_session_id(&self) -> Option<Uuid> {
        *self.current_session_id.lock().unwrap()
    }

    pub fn current_room_id(&self) -> Option<Uuid> {
        *self.current_room_id.lock().unwrap()
    }

    /// The logged-in administrator, or an authentication error
    pub fn require_admin(&self) -> Result<Uuid> {
        self.current_admin_id()
            .ok_or_else(|| Error::Authentication("no administrator logged in".to_string()))
    }

    /// Get current username for the logged-in administrator
    pub fn current_username(&self) -> Option<String> {
        let admin_id = self.current_admin_id()?;
        let db = self.db.lock().unwrap();
        db.admins()
            .find_by_id(admin_id)
            .ok()
            .flatten()
            .map(|a| a.username)
    }

    /// Add a notification (room opened, finalized, published)
    pub fn notify(&self, room_id: Option<Uuid>, content: String) {
        if !self.settings.notifications_enabled {
            return;
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            room_id,
            content,
            timestamp: Utc::now(),
        };
        self.notifications.lock().unwrap().push(notification);
    }

    /// Get notifications for a room
    pub fn notifications_for_room(&self, room_id: Uuid) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.room_id == Some(room_id))
            .cloned()
            .collect()
    }

    /// Clear notifications for a room (e.g. when leaving its page)
    pub fn clear_notifications(&self, room_id: Uuid) {
        self.notifications
            .lock()
            .unwrap()
            .retain(|n| n.room_id != Some(room_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        AppState::with_database(db, Settings::default())
    }

    #[test]
    fn test_require_admin_when_logged_out() {
        let state = test_state();
        assert!(state.require_admin().is_err());

        let id = Uuid::new_v4();
        state.set_current_admin(Some(id));
        assert_eq!(state.require_admin().unwrap(), id);
    }

    #[test]
    fn test_notifications_filtered_by_room() {
        let state = test_state();
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();

        state.notify(Some(room_a), "opened".to_string());
        state.notify(Some(room_b), "closed".to_string());
        state.notify(None, "global".to_string());

        assert_eq!(state.notifications_for_room(room_a).len(), 1);
        state.clear_notifications(room_a);
        assert!(state.notifications_for_room(room_a).is_empty());
        assert_eq!(state.notifications_for_room(room_b).len(), 1);
    }

    #[test]
    fn test_notifications_disabled() {
        let db = Database::open_in_memory().unwrap();
        let settings = Settings {
            notifications_enabled: false,
            ..Settings::default()
        };
        let state = AppState::with_database(db, settings);

        let room = Uuid::new_v4();
        state.notify(Some(room), "opened".to_string());
        assert!(state.notifications_for_room(room).is_empty());
    }
}
