//! Share link storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_datetime_opt, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::ShareLink;

pub struct ShareLinkStore<'a> {
    conn: &'a Connection,
}

impl<'a> ShareLinkStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new share link
    #[instrument(skip(self, link), fields(room_id = %link.room_id))]
    pub fn create(&self, link: &ShareLink) -> Result<()> {
        self.conn.execute(
            "INSERT INTO share_links (id, room_id, token, created_by, created_at, expires_at, max_uses, use_count, is_revoked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                link.id.to_string(),
                link.room_id.to_string(),
                link.token,
                link.created_by.to_string(),
                link.created_at.to_rfc3339(),
                link.expires_at.map(|t| t.to_rfc3339()),
                link.max_uses,
                link.use_count,
                link.is_revoked as i32,
            ],
        )?;
        Ok(())
    }

    /// Find share link by token
    #[instrument(skip(self, token))]
    pub fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, token, created_by, created_at, expires_at, max_uses, use_count, is_revoked
             FROM share_links WHERE token = ?1",
        )?;

        let link = stmt
            .query_row(params![token], Self::row_to_link)
            .optional()?;

        Ok(link)
    }

    /// List share links for a room
    #[instrument(skip(self))]
    pub fn list_for_room(&self, room_id: Uuid) -> Result<Vec<ShareLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, token, created_by, created_at, expires_at, max_uses, use_count, is_revoked
             FROM share_links WHERE room_id = ?1 ORDER BY created_at DESC",
        )?;

        let links = stmt
            .query_map(params![room_id.to_string()], Self::row_to_link)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(links)
    }

    /// Increment use count
    pub fn increment_use_count(&self, link_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE share_links SET use_count = use_count + 1 WHERE id = ?1",
            params![link_id.to_string()],
        )?;
        Ok(())
    }

    /// Revoke share link
    pub fn revoke(&self, link_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE share_links SET is_revoked = 1 WHERE id = ?1",
            params![link_id.to_string()],
        )?;
        Ok(())
    }

    /// Delete all share links for a room
    #[instrument(skip(self))]
    pub fn delete_for_room(&self, room_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM share_links WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        Ok(())
    }

    fn row_to_link(row: &rusqlite::Row<'_>) -> std::result::Result<ShareLink, rusqlite::Error> {
        Ok(ShareLink {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            room_id: parse_uuid(&row.get::<_, String>(1)?)?,
            token: row.get(2)?,
            created_by: parse_uuid(&row.get::<_, String>(3)?)?,
            created_at: parse_datetime(&row.get::<_, String>(4)?)?,
            expires_at: parse_datetime_opt(row.get::<_, Option<String>>(5)?)?,
            max_uses: row.get(6)?,
            use_count: row.get(7)?,
            is_revoked: row.get::<_, i32>(8)? != 0,
        })
    }
}
