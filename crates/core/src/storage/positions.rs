//! Position storage operations
//!
//! Includes the resolution writes. Both the tie fix and the multi-win fix
//! run inside a transaction so a half-applied resolution cannot be left
//! behind.

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_uuid, parse_uuid_opt, OptionalExt};
use crate::error::{Error, Result};
use crate::models::Position;

pub struct PositionStore<'a> {
    conn: &'a Connection,
}

impl<'a> PositionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new position
    #[instrument(skip(self, position), fields(title = %position.title))]
    pub fn create(&self, position: &Position) -> Result<()> {
        self.conn.execute(
            "INSERT INTO positions (id, room_id, title, ord, official_winner_id, forfeited_by_candidate_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                position.id.to_string(),
                position.room_id.to_string(),
                position.title,
                position.ord,
                position.official_winner_id.map(|id| id.to_string()),
                position.forfeited_by_candidate_name,
            ],
        )?;
        Ok(())
    }

    /// Find position by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Position>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, title, ord, official_winner_id, forfeited_by_candidate_name
             FROM positions WHERE id = ?1",
        )?;

        let position = stmt
            .query_row(params![id.to_string()], Self::row_to_position)
            .optional()?;

        Ok(position)
    }

    /// List positions for a room in insertion order
    #[instrument(skip(self))]
    pub fn list_for_room(&self, room_id: Uuid) -> Result<Vec<Position>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, title, ord, official_winner_id, forfeited_by_candidate_name
             FROM positions WHERE room_id = ?1 ORDER BY ord",
        )?;

        let positions = stmt
            .query_map(params![room_id.to_string()], Self::row_to_position)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(positions)
    }

    /// Delete a position
    #[instrument(skip(self))]
    pub fn delete(&self, position_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM positions WHERE id = ?1",
            params![position_id.to_string()],
        )?;
        Ok(())
    }

    /// Mark one candidate as the position's official winner and every
    /// sibling as a non-winner. Used to settle a tie.
    #[instrument(skip(self))]
    pub fn set_official_winner(&self, position_id: Uuid, candidate_id: Uuid) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let belongs: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM candidates WHERE id = ?1 AND position_id = ?2",
                params![candidate_id.to_string(), position_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if belongs.is_none() {
            return Err(Error::NotFound(format!(
                "candidate {candidate_id} does not belong to position {position_id}"
            )));
        }

        tx.execute(
            "UPDATE candidates SET is_official_winner = 0 WHERE position_id = ?1",
            params![position_id.to_string()],
        )?;
        tx.execute(
            "UPDATE candidates SET is_official_winner = 1 WHERE id = ?1",
            params![candidate_id.to_string()],
        )?;
        tx.execute(
            "UPDATE positions SET official_winner_id = ?1 WHERE id = ?2",
            params![candidate_id.to_string(), position_id.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Record that a candidate name forfeits this position. The candidate
    /// row stays; the name just stops counting toward winner selection.
    #[instrument(skip(self))]
    pub fn record_forfeit(&self, position_id: Uuid, candidate_name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE positions SET forfeited_by_candidate_name = ?1 WHERE id = ?2",
            params![candidate_name, position_id.to_string()],
        )?;
        Ok(())
    }

    /// Settle a multi-position win in one transaction: the matching
    /// candidate in the chosen position becomes official winner, and every
    /// other position in the conflict set gets the forfeit marker. Either
    /// all writes land or none do.
    #[instrument(skip(self, forfeit_position_ids))]
    pub fn resolve_multi_win(
        &self,
        chosen_position_id: Uuid,
        chosen_candidate_id: Uuid,
        candidate_name: &str,
        forfeit_position_ids: &[Uuid],
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "UPDATE candidates SET is_official_winner = 0 WHERE position_id = ?1",
            params![chosen_position_id.to_string()],
        )?;
        tx.execute(
            "UPDATE candidates SET is_official_winner = 1 WHERE id = ?1",
            params![chosen_candidate_id.to_string()],
        )?;
        tx.execute(
            "UPDATE positions SET official_winner_id = ?1 WHERE id = ?2",
            params![
                chosen_candidate_id.to_string(),
                chosen_position_id.to_string()
            ],
        )?;

        for position_id in forfeit_position_ids {
            let updated = tx.execute(
                "UPDATE positions SET forfeited_by_candidate_name = ?1 WHERE id = ?2",
                params![candidate_name, position_id.to_string()],
            )?;
            if updated == 0 {
                // Rolls back the whole resolution on drop
                return Err(Error::PartialResolution(format!(
                    "position {position_id} not found while forfeiting {candidate_name}"
                )));
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn row_to_position(row: &rusqlite::Row<'_>) -> std::result::Result<Position, rusqlite::Error> {
        Ok(Position {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            room_id: parse_uuid(&row.get::<_, String>(1)?)?,
            title: row.get(2)?,
            ord: row.get(3)?,
            official_winner_id: parse_uuid_opt(row.get::<_, Option<String>>(4)?)?,
            forfeited_by_candidate_name: row.get(5)?,
        })
    }
}
