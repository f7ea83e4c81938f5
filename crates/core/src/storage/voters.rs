//! Voter storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Voter;

pub struct VoterStore<'a> {
    conn: &'a Connection,
}

impl<'a> VoterStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a participant in a room
    #[instrument(skip(self, voter), fields(room_id = %voter.room_id))]
    pub fn register(&self, voter: &Voter) -> Result<()> {
        self.conn.execute(
            "INSERT INTO voters (id, room_id, display_name, joined_at, has_submitted)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                voter.id.to_string(),
                voter.room_id.to_string(),
                voter.display_name,
                voter.joined_at.to_rfc3339(),
                voter.has_submitted as i32,
            ],
        )?;
        Ok(())
    }

    /// Find voter by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Voter>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, display_name, joined_at, has_submitted
             FROM voters WHERE id = ?1",
        )?;

        let voter = stmt
            .query_row(params![id.to_string()], Self::row_to_voter)
            .optional()?;

        Ok(voter)
    }

    /// List voters for a room
    #[instrument(skip(self))]
    pub fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Voter>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, display_name, joined_at, has_submitted
             FROM voters WHERE room_id = ?1 ORDER BY joined_at",
        )?;

        let voters = stmt
            .query_map(params![room_id.to_string()], Self::row_to_voter)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(voters)
    }

    /// Mark that a voter has turned in their ballot/reviews
    #[instrument(skip(self))]
    pub fn mark_submitted(&self, voter_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE voters SET has_submitted = 1 WHERE id = ?1",
            params![voter_id.to_string()],
        )?;
        Ok(())
    }

    /// Number of registered voters in a room
    #[instrument(skip(self))]
    pub fn count_for_room(&self, room_id: Uuid) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM voters WHERE room_id = ?1",
            params![room_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete all voters for a room
    #[instrument(skip(self))]
    pub fn delete_for_room(&self, room_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM voters WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        Ok(())
    }

    fn row_to_voter(row: &rusqlite::Row<'_>) -> std::result::Result<Voter, rusqlite::Error> {
        Ok(Voter {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            room_id: parse_uuid(&row.get::<_, String>(1)?)?,
            display_name: row.get(2)?,
            joined_at: parse_datetime(&row.get::<_, String>(3)?)?,
            has_submitted: row.get::<_, i32>(4)? != 0,
        })
    }
}
