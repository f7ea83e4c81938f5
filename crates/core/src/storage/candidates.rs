//! Candidate storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Candidate;

pub struct CandidateStore<'a> {
    conn: &'a Connection,
}

impl<'a> CandidateStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new candidate
    #[instrument(skip(self, candidate), fields(name = %candidate.name))]
    pub fn create(&self, candidate: &Candidate) -> Result<()> {
        self.conn.execute(
            "INSERT INTO candidates (id, position_id, name, ord, is_official_winner)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                candidate.id.to_string(),
                candidate.position_id.to_string(),
                candidate.name,
                candidate.ord,
                candidate.is_official_winner as i32,
            ],
        )?;
        Ok(())
    }

    /// Find candidate by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, position_id, name, ord, is_official_winner
             FROM candidates WHERE id = ?1",
        )?;

        let candidate = stmt
            .query_row(params![id.to_string()], Self::row_to_candidate)
            .optional()?;

        Ok(candidate)
    }

    /// List candidates for a position in insertion order
    #[instrument(skip(self))]
    pub fn list_for_position(&self, position_id: Uuid) -> Result<Vec<Candidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, position_id, name, ord, is_official_winner
             FROM candidates WHERE position_id = ?1 ORDER BY ord",
        )?;

        let candidates = stmt
            .query_map(params![position_id.to_string()], Self::row_to_candidate)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(candidates)
    }

    /// Find a position's candidate by name (the cross-position identity)
    #[instrument(skip(self))]
    pub fn find_by_name(&self, position_id: Uuid, name: &str) -> Result<Option<Candidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, position_id, name, ord, is_official_winner
             FROM candidates WHERE position_id = ?1 AND name = ?2",
        )?;

        let candidate = stmt
            .query_row(params![position_id.to_string(), name], Self::row_to_candidate)
            .optional()?;

        Ok(candidate)
    }

    /// Delete a candidate
    #[instrument(skip(self))]
    pub fn delete(&self, candidate_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM candidates WHERE id = ?1",
            params![candidate_id.to_string()],
        )?;
        Ok(())
    }

    fn row_to_candidate(
        row: &rusqlite::Row<'_>,
    ) -> std::result::Result<Candidate, rusqlite::Error> {
        Ok(Candidate {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            position_id: parse_uuid(&row.get::<_, String>(1)?)?,
            name: row.get(2)?,
            ord: row.get(3)?,
            is_official_winner: row.get::<_, i32>(4)? != 0,
        })
    }
}
