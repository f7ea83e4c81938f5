//! Ballot storage operations
//!
//! Append-only while a room is open; tallied with GROUP BY at read time;
//! destroyed wholesale when the room is finalized.

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::models::Ballot;

pub struct BallotStore<'a> {
    conn: &'a Connection,
}

impl<'a> BallotStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a vote. One ballot per voter per position; a duplicate is
    /// rejected rather than overwritten.
    #[instrument(skip(self, ballot), fields(position_id = %ballot.position_id))]
    pub fn cast(&self, ballot: &Ballot) -> Result<()> {
        let candidate_ok: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM candidates WHERE id = ?1 AND position_id = ?2",
                params![
                    ballot.candidate_id.to_string(),
                    ballot.position_id.to_string()
                ],
                |row| row.get(0),
            )
            .optional()?;
        if candidate_ok.is_none() {
            return Err(Error::NotFound(
                "candidate not found for position".to_string(),
            ));
        }

        let already: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM ballots WHERE voter_id = ?1 AND position_id = ?2",
                params![
                    ballot.voter_id.to_string(),
                    ballot.position_id.to_string()
                ],
                |row| row.get(0),
            )
            .optional()?;
        if already.is_some() {
            return Err(Error::InvalidOperation(
                "voter already cast a ballot for this position".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO ballots (id, room_id, position_id, candidate_id, voter_id, cast_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                ballot.id.to_string(),
                ballot.room_id.to_string(),
                ballot.position_id.to_string(),
                ballot.candidate_id.to_string(),
                ballot.voter_id.to_string(),
                ballot.cast_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Vote counts per candidate for one position
    #[instrument(skip(self))]
    pub fn counts_for_position(&self, position_id: Uuid) -> Result<Vec<(Uuid, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT candidate_id, COUNT(*) FROM ballots
             WHERE position_id = ?1 GROUP BY candidate_id",
        )?;

        let counts = stmt
            .query_map(params![position_id.to_string()], |row| {
                Ok((
                    parse_uuid(&row.get::<_, String>(0)?)?,
                    row.get::<_, i64>(1)? as u64,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Total ballots cast in a room
    #[instrument(skip(self))]
    pub fn count_for_room(&self, room_id: Uuid) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ballots WHERE room_id = ?1",
            params![room_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// List a voter's ballots in a room
    #[instrument(skip(self))]
    pub fn list_for_voter(&self, room_id: Uuid, voter_id: Uuid) -> Result<Vec<Ballot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, room_id, position_id, candidate_id, voter_id, cast_at
             FROM ballots WHERE room_id = ?1 AND voter_id = ?2",
        )?;

        let ballots = stmt
            .query_map(
                params![room_id.to_string(), voter_id.to_string()],
                |row| {
                    Ok(Ballot {
                        id: parse_uuid(&row.get::<_, String>(0)?)?,
                        room_id: parse_uuid(&row.get::<_, String>(1)?)?,
                        position_id: parse_uuid(&row.get::<_, String>(2)?)?,
                        candidate_id: parse_uuid(&row.get::<_, String>(3)?)?,
                        voter_id: parse_uuid(&row.get::<_, String>(4)?)?,
                        cast_at: parse_datetime(&row.get::<_, String>(5)?)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ballots)
    }

    /// Delete all ballots for a room
    #[instrument(skip(self))]
    pub fn delete_for_room(&self, room_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM ballots WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        Ok(())
    }
}
