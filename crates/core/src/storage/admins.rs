//! Administrator storage operations

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_datetime_opt, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Admin, Session};

pub struct AdminStore<'a> {
    conn: &'a Connection,
}

impl<'a> AdminStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new administrator
    #[instrument(skip(self, admin), fields(username = %admin.username))]
    pub fn create(&self, admin: &Admin) -> Result<()> {
        self.conn.execute(
            "INSERT INTO admins (id, username, password_hash, created_at, last_login) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                admin.id.to_string(),
                admin.username,
                admin.password_hash,
                admin.created_at.to_rfc3339(),
                admin.last_login.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Find administrator by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, password_hash, created_at, last_login FROM admins WHERE id = ?1",
        )?;

        let admin = stmt
            .query_row(params![id.to_string()], Self::row_to_admin)
            .optional()?;

        Ok(admin)
    }

    /// Find administrator by username
    #[instrument(skip(self))]
    pub fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, password_hash, created_at, last_login FROM admins WHERE username = ?1",
        )?;

        let admin = stmt
            .query_row(params![username], Self::row_to_admin)
            .optional()?;

        Ok(admin)
    }

    /// Update last login time
    pub fn update_last_login(&self, admin_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE admins SET last_login = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), admin_id.to_string()],
        )?;
        Ok(())
    }

    /// Create a session
    #[instrument(skip(self, session), fields(admin_id = %session.admin_id))]
    pub fn create_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, admin_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.admin_id.to_string(),
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find valid session
    #[instrument(skip(self))]
    pub fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, admin_id, created_at, expires_at FROM sessions WHERE id = ?1 AND expires_at > ?2",
        )?;

        let now = Utc::now().to_rfc3339();
        let session = stmt
            .query_row(params![session_id.to_string(), now], |row| {
                Ok(Session {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    admin_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?)?,
                    expires_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })
            .optional()?;

        Ok(session)
    }

    /// Delete session
    pub fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(())
    }

    /// Delete all sessions for an administrator
    pub fn delete_admin_sessions(&self, admin_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sessions WHERE admin_id = ?1",
            params![admin_id.to_string()],
        )?;
        Ok(())
    }

    /// Clean up expired sessions
    pub fn cleanup_expired_sessions(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(count as u64)
    }

    fn row_to_admin(row: &rusqlite::Row<'_>) -> std::result::Result<Admin, rusqlite::Error> {
        Ok(Admin {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: parse_datetime(&row.get::<_, String>(3)?)?,
            last_login: parse_datetime_opt(row.get::<_, Option<String>>(4)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_admin_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let admin = Admin::new("chair".to_string(), "argon2hash".to_string());
        db.admins().create(&admin).unwrap();

        let by_name = db.admins().find_by_username("chair").unwrap().unwrap();
        assert_eq!(by_name.id, admin.id);
        assert!(by_name.last_login.is_none());
    }

    #[test]
    fn test_session_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let admin = Admin::new("chair".to_string(), "hash".to_string());
        db.admins().create(&admin).unwrap();

        let session = Session::new(admin.id, 1);
        db.admins().create_session(&session).unwrap();
        assert!(db
            .admins()
            .find_valid_session(session.id)
            .unwrap()
            .is_some());

        db.admins().delete_session(session.id).unwrap();
        assert!(db
            .admins()
            .find_valid_session(session.id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_expired_session_not_valid() {
        let db = Database::open_in_memory().unwrap();
        let admin = Admin::new("chair".to_string(), "hash".to_string());
        db.admins().create(&admin).unwrap();

        let mut session = Session::new(admin.id, 1);
        session.expires_at = Utc::now() - chrono::Duration::hours(1);
        db.admins().create_session(&session).unwrap();

        assert!(db
            .admins()
            .find_valid_session(session.id)
            .unwrap()
            .is_none());
        assert_eq!(db.admins().cleanup_expired_sessions().unwrap(), 1);
    }
}
