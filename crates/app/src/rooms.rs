//! Room management services
//!
//! Creating rooms with their positions and candidates, moving them through
//! the lifecycle, and issuing the share links participants join through.

use caucus_core::{
    Candidate, Error, Position, Result, Room, RoomKind, RoomStatus, ShareLink, Voter,
};
use rand::Rng;
use tracing::instrument;
use uuid::Uuid;

use crate::state::AppState;

/// A position definition at room creation time
#[derive(Debug, Clone)]
pub struct PositionDraft {
    pub title: String,
    pub candidates: Vec<String>,
}

/// Create a room with its positions and candidates in one step
#[instrument(skip(state, positions), fields(title = %title))]
pub fn create_room(
    state: &AppState,
    title: &str,
    description: Option<String>,
    kind: RoomKind,
    positions: &[PositionDraft],
) -> Result<Room> {
    let admin_id = state.require_admin()?;

    if title.trim().is_empty() {
        return Err(Error::InvalidOperation("room title is empty".to_string()));
    }

    let room = Room::new(title.to_string(), description, kind, admin_id);

    let db = state.db.lock().unwrap();
    db.rooms().create(&room)?;

    for (ord, draft) in positions.iter().enumerate() {
        let position = Position::new(room.id, draft.title.clone(), ord as u32);
        db.positions().create(&position)?;

        for (ord, name) in draft.candidates.iter().enumerate() {
            let candidate = Candidate::new(position.id, name.clone(), ord as u32);
            db.candidates().create(&candidate)?;
        }
    }
    db.preferences().set_last_room(admin_id, room.id)?;
    drop(db);

    state.set_current_room(Some(room.id));
    Ok(room)
}

/// Add a position to a draft room
#[instrument(skip(state))]
pub fn add_position(state: &AppState, room_id: Uuid, title: &str) -> Result<Position> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status != RoomStatus::Draft {
        return Err(Error::InvalidOperation(
            "positions can only be edited while the room is a draft".to_string(),
        ));
    }

    let ord = db.positions().list_for_room(room_id)?.len() as u32;
    let position = Position::new(room_id, title.to_string(), ord);
    db.positions().create(&position)?;
    Ok(position)
}

/// Add a candidate to a position in a draft room
#[instrument(skip(state))]
pub fn add_candidate(state: &AppState, position_id: Uuid, name: &str) -> Result<Candidate> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let position = db
        .positions()
        .find_by_id(position_id)?
        .ok_or_else(|| Error::NotFound(format!("position {position_id}")))?;
    let room = require_room(&db, position.room_id)?;
    if room.status != RoomStatus::Draft {
        return Err(Error::InvalidOperation(
            "candidates can only be edited while the room is a draft".to_string(),
        ));
    }

    let ord = db.candidates().list_for_position(position_id)?.len() as u32;
    let candidate = Candidate::new(position_id, name.to_string(), ord);
    db.candidates().create(&candidate)?;
    Ok(candidate)
}

/// Open a draft room for submissions
#[instrument(skip(state))]
pub fn open_room(state: &AppState, room_id: Uuid) -> Result<()> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status != RoomStatus::Draft {
        return Err(Error::InvalidOperation(format!(
            "cannot open a {} room",
            room.status.as_str()
        )));
    }
    if db.positions().list_for_room(room_id)?.is_empty() {
        return Err(Error::InvalidOperation(
            "cannot open a room with no positions".to_string(),
        ));
    }

    db.rooms().set_status(room_id, RoomStatus::Open)?;
    drop(db);

    state.notify(Some(room_id), format!("{} is open", room.title));
    Ok(())
}

/// Close an open room; submissions stop, results become visible
#[instrument(skip(state))]
pub fn close_room(state: &AppState, room_id: Uuid) -> Result<()> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status != RoomStatus::Open {
        return Err(Error::InvalidOperation(format!(
            "cannot close a {} room",
            room.status.as_str()
        )));
    }

    db.rooms().set_status(room_id, RoomStatus::Closed)?;
    drop(db);

    state.notify(Some(room_id), format!("{} is closed", room.title));
    Ok(())
}

/// Issue a share link for an open or draft room
#[instrument(skip(state))]
pub fn issue_share_link(
    state: &AppState,
    room_id: Uuid,
    max_uses: Option<u32>,
) -> Result<ShareLink> {
    let admin_id = state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status == RoomStatus::Closed || room.is_finalized() {
        return Err(Error::InvalidOperation(
            "cannot issue links for a closed room".to_string(),
        ));
    }

    // Generate random token
    let token: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(state.settings.token_length)
        .map(char::from)
        .collect();

    let mut link =
        ShareLink::new(room_id, admin_id, token).with_expiry(state.settings.link_expiry_hours);
    if let Some(max) = max_uses {
        link = link.with_max_uses(max);
    }

    db.share_links().create(&link)?;
    Ok(link)
}

/// Revoke a share link
#[instrument(skip(state))]
pub fn revoke_share_link(state: &AppState, link_id: Uuid) -> Result<()> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    db.share_links().revoke(link_id)?;
    Ok(())
}

/// Join a room through a share link, registering as a participant.
/// No account is created; the voter exists only within this room.
#[instrument(skip(state, token))]
pub fn join_via_link(state: &AppState, token: &str, display_name: &str) -> Result<Voter> {
    let db = state.db.lock().unwrap();

    let link = db
        .share_links()
        .find_by_token(token)?
        .ok_or_else(|| Error::NotFound("share link not found".to_string()))?;
    if !link.is_valid() {
        return Err(Error::InvalidOperation(
            "share link expired or revoked".to_string(),
        ));
    }

    let room = require_room(&db, link.room_id)?;
    if !room.status.accepts_submissions() {
        return Err(Error::InvalidOperation(
            "room is not accepting submissions".to_string(),
        ));
    }

    let voter = Voter::new(room.id, display_name.to_string());
    db.voters().register(&voter)?;
    db.share_links().increment_use_count(link.id)?;

    Ok(voter)
}

pub(crate) fn require_room(db: &caucus_core::Database, room_id: Uuid) -> Result<Room> {
    db.rooms()
        .find_by_id(room_id)?
        .ok_or_else(|| Error::NotFound(format!("room {room_id}")))
}
