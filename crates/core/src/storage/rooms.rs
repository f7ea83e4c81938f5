//! Room storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    parse_datetime, parse_datetime_opt, parse_uuid, room_kind_from_str, room_status_from_str,
    OptionalExt,
};
use crate::error::Result;
use crate::models::{FinalizedResults, Room, RoomStatus};

pub struct RoomStore<'a> {
    conn: &'a Connection,
}

impl<'a> RoomStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new room
    #[instrument(skip(self, room), fields(room_title = %room.title))]
    pub fn create(&self, room: &Room) -> Result<()> {
        self.conn.execute(
            "INSERT INTO rooms (id, title, description, kind, status, created_by, created_at, finalized_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                room.id.to_string(),
                room.title,
                room.description,
                room.kind.as_str(),
                room.status.as_str(),
                room.created_by.to_string(),
                room.created_at.to_rfc3339(),
                room.finalized_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Find room by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Room>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, kind, status, created_by, created_at, finalized_at
             FROM rooms WHERE id = ?1",
        )?;

        let room = stmt
            .query_row(params![id.to_string()], Self::row_to_room)
            .optional()?;

        Ok(room)
    }

    /// Update room title/description/status
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    pub fn update(&self, room: &Room) -> Result<()> {
        self.conn.execute(
            "UPDATE rooms SET title = ?1, description = ?2, status = ?3, finalized_at = ?4
             WHERE id = ?5",
            params![
                room.title,
                room.description,
                room.status.as_str(),
                room.finalized_at.map(|t| t.to_rfc3339()),
                room.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Delete room (cascades to positions, candidates, working records)
    #[instrument(skip(self))]
    pub fn delete(&self, room_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM rooms WHERE id = ?1",
            params![room_id.to_string()],
        )?;
        Ok(())
    }

    /// List all rooms created by an administrator
    #[instrument(skip(self))]
    pub fn list_for_admin(&self, admin_id: Uuid) -> Result<Vec<Room>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, kind, status, created_by, created_at, finalized_at
             FROM rooms WHERE created_by = ?1 ORDER BY created_at DESC",
        )?;

        let rooms = stmt
            .query_map(params![admin_id.to_string()], Self::row_to_room)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rooms)
    }

    /// Update room status
    #[instrument(skip(self))]
    pub fn set_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE rooms SET status = ?1 WHERE id = ?2",
            params![status.as_str(), room_id.to_string()],
        )?;
        Ok(())
    }

    /// Load the frozen results summary, if the room was finalized
    #[instrument(skip(self))]
    pub fn load_snapshot(&self, room_id: Uuid) -> Result<Option<FinalizedResults>> {
        let json: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT finalized_results FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match json.flatten() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Finalize a room in one transaction: write the snapshot, flip the
    /// status, and destroy the working records. There is no undo; the raw
    /// ballots, reviews, voters and share links are deleted, not archived.
    #[instrument(skip(self, snapshot), fields(room_id = %room_id))]
    pub fn finalize(&self, room_id: Uuid, snapshot: &FinalizedResults) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "UPDATE rooms SET status = ?1, finalized_at = ?2, finalized_results = ?3 WHERE id = ?4",
            params![
                RoomStatus::Finalized.as_str(),
                snapshot.finalized_at.to_rfc3339(),
                json,
                room_id.to_string(),
            ],
        )?;
        tx.execute(
            "DELETE FROM ballots WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM reviews WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM voters WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM share_links WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn row_to_room(row: &rusqlite::Row<'_>) -> std::result::Result<Room, rusqlite::Error> {
        Ok(Room {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            title: row.get(1)?,
            description: row.get(2)?,
            kind: room_kind_from_str(&row.get::<_, String>(3)?),
            status: room_status_from_str(&row.get::<_, String>(4)?),
            created_by: parse_uuid(&row.get::<_, String>(5)?)?,
            created_at: parse_datetime(&row.get::<_, String>(6)?)?,
            finalized_at: parse_datetime_opt(row.get::<_, Option<String>>(7)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Admin, RoomKind};
    use crate::storage::Database;

    fn create_test_admin(db: &Database) -> Uuid {
        let admin = Admin::new("chair".to_string(), "hash".to_string());
        let id = admin.id;
        db.admins().create(&admin).unwrap();
        id
    }

    #[test]
    fn test_room_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let admin_id = create_test_admin(&db);

        let room = Room::new(
            "Board Election 2026".to_string(),
            Some("Annual board vote".to_string()),
            RoomKind::Election,
            admin_id,
        );
        db.rooms().create(&room).unwrap();

        let loaded = db.rooms().find_by_id(room.id).unwrap().unwrap();
        assert_eq!(loaded.title, room.title);
        assert_eq!(loaded.kind, RoomKind::Election);
        assert_eq!(loaded.status, RoomStatus::Draft);
    }

    #[test]
    fn test_status_transitions() {
        let db = Database::open_in_memory().unwrap();
        let admin_id = create_test_admin(&db);

        let room = Room::new("Vote".to_string(), None, RoomKind::Election, admin_id);
        db.rooms().create(&room).unwrap();

        db.rooms().set_status(room.id, RoomStatus::Open).unwrap();
        let loaded = db.rooms().find_by_id(room.id).unwrap().unwrap();
        assert!(loaded.status.accepts_submissions());

        db.rooms().set_status(room.id, RoomStatus::Closed).unwrap();
        let loaded = db.rooms().find_by_id(room.id).unwrap().unwrap();
        assert!(!loaded.status.accepts_submissions());
    }

    #[test]
    fn test_snapshot_absent_before_finalize() {
        let db = Database::open_in_memory().unwrap();
        let admin_id = create_test_admin(&db);

        let room = Room::new("Vote".to_string(), None, RoomKind::Election, admin_id);
        db.rooms().create(&room).unwrap();

        assert!(db.rooms().load_snapshot(room.id).unwrap().is_none());
    }

    #[test]
    fn test_list_for_admin_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let admin_id = create_test_admin(&db);

        for title in ["a", "b"] {
            let room = Room::new(title.to_string(), None, RoomKind::Review, admin_id);
            db.rooms().create(&room).unwrap();
        }

        let rooms = db.rooms().list_for_admin(admin_id).unwrap();
        assert_eq!(rooms.len(), 2);
    }
}
