//! Results reader
//!
//! Live tallies are recomputed from the raw records on every load; a
//! finalized room serves its frozen snapshot instead, because the records
//! behind the live view no longer exist.

use caucus_core::{
    conflict, tally_room, ConflictReport, Error, FinalizedResults, Result, Room, TalliedPosition,
};
use tracing::instrument;
use uuid::Uuid;

use crate::rooms::require_room;
use crate::state::AppState;

/// A room's live results: fresh tallies plus whatever currently blocks
/// finalization
#[derive(Debug)]
pub struct RoomResults {
    pub room: Room,
    pub tallies: Vec<TalliedPosition>,
    pub report: ConflictReport,
}

/// Load live results for a room. Finalized rooms have no live records
/// left; use [`load_snapshot`] for those.
#[instrument(skip(state))]
pub fn load_results(state: &AppState, room_id: Uuid) -> Result<RoomResults> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.is_finalized() {
        return Err(Error::InvalidOperation(
            "room is finalized; load the snapshot instead".to_string(),
        ));
    }

    let tallies = tally_room(&db, room_id)?;
    let report = conflict::detect(&tallies);

    Ok(RoomResults {
        room,
        tallies,
        report,
    })
}

/// Load the frozen results of a finalized room
#[instrument(skip(state))]
pub fn load_snapshot(state: &AppState, room_id: Uuid) -> Result<FinalizedResults> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    db.rooms()
        .load_snapshot(room_id)?
        .ok_or_else(|| Error::NotFound(format!("no snapshot for room {room_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::collector;
    use crate::rooms::{self, PositionDraft};
    use crate::settings::Settings;
    use caucus_core::{Database, RoomKind};

    fn voting_state() -> (AppState, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::with_database(db, Settings::default());
        auth::register(&state, "chair", "hunter22").unwrap();

        let room = rooms::create_room(
            &state,
            "Vote",
            None,
            RoomKind::Election,
            &[PositionDraft {
                title: "President".to_string(),
                candidates: vec!["Alice".to_string(), "Bob".to_string()],
            }],
        )
        .unwrap();
        rooms::open_room(&state, room.id).unwrap();
        (state, room.id)
    }

    fn vote(state: &AppState, room_id: Uuid, candidate: &str, times: usize) {
        let (position_id, candidate_id) = {
            let db = state.db.lock().unwrap();
            let position = db.positions().list_for_room(room_id).unwrap().remove(0);
            let candidate = db
                .candidates()
                .find_by_name(position.id, candidate)
                .unwrap()
                .unwrap();
            (position.id, candidate.id)
        };
        for _ in 0..times {
            let link = rooms::issue_share_link(state, room_id, None).unwrap();
            let voter = rooms::join_via_link(state, &link.token, "v").unwrap();
            collector::cast_ballot(state, voter.id, position_id, candidate_id).unwrap();
        }
    }

    #[test]
    fn test_live_results_with_clear_winner() {
        let (state, room_id) = voting_state();
        vote(&state, room_id, "Alice", 3);
        vote(&state, room_id, "Bob", 1);
        rooms::close_room(&state, room_id).unwrap();

        let results = load_results(&state, room_id).unwrap();
        assert!(results.report.all_resolved());
        let winners = results.tallies[0].current_winners();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].candidate.name, "Alice");
    }

    #[test]
    fn test_live_results_surface_tie() {
        let (state, room_id) = voting_state();
        vote(&state, room_id, "Alice", 2);
        vote(&state, room_id, "Bob", 2);
        rooms::close_room(&state, room_id).unwrap();

        let results = load_results(&state, room_id).unwrap();
        assert_eq!(results.report.ties.len(), 1);
    }

    #[test]
    fn test_snapshot_missing_before_finalize() {
        let (state, room_id) = voting_state();
        assert!(load_snapshot(&state, room_id).is_err());
    }
}
