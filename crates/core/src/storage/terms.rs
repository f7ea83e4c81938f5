//! Leadership term storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Term, TermEntry};

pub struct TermStore<'a> {
    conn: &'a Connection,
}

impl<'a> TermStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a term. If marked current, every other term is demoted in
    /// the same transaction.
    #[instrument(skip(self, term), fields(label = %term.label))]
    pub fn create(&self, term: &Term) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        if term.is_current {
            tx.execute("UPDATE terms SET is_current = 0", [])?;
        }
        tx.execute(
            "INSERT INTO terms (id, label, started_at, is_current) VALUES (?1, ?2, ?3, ?4)",
            params![
                term.id.to_string(),
                term.label,
                term.started_at.to_rfc3339(),
                term.is_current as i32,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// The term currently shown on the homepage
    #[instrument(skip(self))]
    pub fn current(&self) -> Result<Option<Term>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, started_at, is_current FROM terms WHERE is_current = 1",
        )?;

        let term = stmt.query_row([], Self::row_to_term).optional()?;
        Ok(term)
    }

    /// All terms, newest first
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Term>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, started_at, is_current FROM terms ORDER BY started_at DESC",
        )?;

        let terms = stmt
            .query_map([], Self::row_to_term)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(terms)
    }

    /// Add a leadership entry to a term
    #[instrument(skip(self, entry), fields(holder = %entry.holder_name))]
    pub fn add_entry(&self, entry: &TermEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO term_entries (id, term_id, room_id, position_title, holder_name, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id.to_string(),
                entry.term_id.to_string(),
                entry.room_id.to_string(),
                entry.position_title,
                entry.holder_name,
                entry.published_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List a term's entries in publish order
    #[instrument(skip(self))]
    pub fn entries_for_term(&self, term_id: Uuid) -> Result<Vec<TermEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, term_id, room_id, position_title, holder_name, published_at
             FROM term_entries WHERE term_id = ?1 ORDER BY published_at, position_title",
        )?;

        let entries = stmt
            .query_map(params![term_id.to_string()], |row| {
                Ok(TermEntry {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    term_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    room_id: parse_uuid(&row.get::<_, String>(2)?)?,
                    position_title: row.get(3)?,
                    holder_name: row.get(4)?,
                    published_at: parse_datetime(&row.get::<_, String>(5)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Remove a room's entries from a term (used when republishing)
    #[instrument(skip(self))]
    pub fn delete_entries_for_room(&self, term_id: Uuid, room_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM term_entries WHERE term_id = ?1 AND room_id = ?2",
            params![term_id.to_string(), room_id.to_string()],
        )?;
        Ok(())
    }

    fn row_to_term(row: &rusqlite::Row<'_>) -> std::result::Result<Term, rusqlite::Error> {
        Ok(Term {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            label: row.get(1)?,
            started_at: parse_datetime(&row.get::<_, String>(2)?)?,
            is_current: row.get::<_, i32>(3)? != 0,
        })
    }
}
