//! Review storage operations
//!
//! Star ratings for review rooms. Averaged per candidate at read time.

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::models::Review;

pub struct ReviewStore<'a> {
    conn: &'a Connection,
}

impl<'a> ReviewStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a review. One review per reviewer per candidate.
    #[instrument(skip(self, review), fields(candidate_id = %review.candidate_id))]
    pub fn submit(&self, review: &Review) -> Result<()> {
        if !review.rating_in_range() {
            return Err(Error::InvalidOperation(format!(
                "rating {} out of range",
                review.rating
            )));
        }

        let already: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM reviews WHERE reviewer_id = ?1 AND candidate_id = ?2",
                params![
                    review.reviewer_id.to_string(),
                    review.candidate_id.to_string()
                ],
                |row| row.get(0),
            )
            .optional()?;
        if already.is_some() {
            return Err(Error::InvalidOperation(
                "reviewer already rated this candidate".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO reviews (id, room_id, candidate_id, reviewer_id, rating, comment, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                review.id.to_string(),
                review.room_id.to_string(),
                review.candidate_id.to_string(),
                review.reviewer_id.to_string(),
                review.rating,
                review.comment,
                review.submitted_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Average rating per candidate for one position
    #[instrument(skip(self))]
    pub fn averages_for_position(&self, position_id: Uuid) -> Result<Vec<(Uuid, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.candidate_id, AVG(r.rating)
             FROM reviews r
             INNER JOIN candidates c ON c.id = r.candidate_id
             WHERE c.position_id = ?1
             GROUP BY r.candidate_id",
        )?;

        let averages = stmt
            .query_map(params![position_id.to_string()], |row| {
                Ok((
                    parse_uuid(&row.get::<_, String>(0)?)?,
                    row.get::<_, f64>(1)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(averages)
    }

    /// Number of reviews submitted in a room
    #[instrument(skip(self))]
    pub fn count_for_room(&self, room_id: Uuid) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE room_id = ?1",
            params![room_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete all reviews for a room
    #[instrument(skip(self))]
    pub fn delete_for_room(&self, room_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM reviews WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        Ok(())
    }
}
