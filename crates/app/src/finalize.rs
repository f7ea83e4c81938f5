//! Room finalizer
//!
//! The irreversible step: freeze the tallies into a snapshot, then destroy
//! the ballots, reviews, voters and share links they came from. Blocked
//! while any conflict remains, and gated on the administrator's password.

use caucus_core::{
    conflict, tally_room, Error, FinalCandidate, FinalPosition, FinalizedResults, Result,
    RoomKind, RoomStatus, TalliedPosition,
};
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth;
use crate::resolutions::ActionOutcome;
use crate::rooms::require_room;
use crate::state::AppState;

fn snapshot_position(tally: &TalliedPosition) -> FinalPosition {
    let winner = match tally.position.official_winner_id {
        Some(winner_id) => tally
            .candidates
            .iter()
            .find(|c| c.candidate.id == winner_id)
            .map(|c| c.candidate.name.clone()),
        None => {
            let winners = tally.current_winners();
            match winners.as_slice() {
                [only] => Some(only.candidate.name.clone()),
                _ => None,
            }
        }
    };

    let candidates = tally
        .candidates
        .iter()
        .map(|c| FinalCandidate {
            name: c.candidate.name.clone(),
            vote_count: c.vote_count,
            average_rating: c.average_rating,
            is_official_winner: winner.as_deref() == Some(c.candidate.name.as_str()),
        })
        .collect();

    FinalPosition {
        position_id: tally.position.id,
        title: tally.position.title.clone(),
        winner,
        forfeited_by: tally.position.forfeited_by_candidate_name.clone(),
        candidates,
    }
}

/// Finalize a closed, conflict-free room.
///
/// There is no undo. The working records are deleted in the same
/// transaction that stores the snapshot.
#[instrument(skip(state, password))]
pub fn finalize_room(state: &AppState, room_id: Uuid, password: &str) -> Result<ActionOutcome> {
    state.require_admin()?;

    if !auth::reauthenticate(state, password)? {
        warn!(%room_id, "finalize rejected: password mismatch");
        return Ok(ActionOutcome::failed("Incorrect password"));
    }

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status != RoomStatus::Closed {
        return Err(Error::InvalidOperation(format!(
            "cannot finalize a {} room",
            room.status.as_str()
        )));
    }

    let tallies = tally_room(&db, room_id)?;
    let report = conflict::detect(&tallies);
    if !report.all_resolved() {
        return Ok(ActionOutcome::failed(format!(
            "Cannot finalize: {} tie(s) and {} multi-position win(s) remain",
            report.ties.len(),
            report.multi_wins.len()
        )));
    }

    let total_ballots = match room.kind {
        RoomKind::Election => db.ballots().count_for_room(room_id)?,
        RoomKind::Review => db.reviews().count_for_room(room_id)?,
    };

    let snapshot = FinalizedResults {
        room_id,
        finalized_at: Utc::now(),
        total_ballots,
        positions: tallies.iter().map(snapshot_position).collect(),
    };

    db.rooms().finalize(room_id, &snapshot)?;
    drop(db);

    info!(%room_id, "room finalized, working records destroyed");
    state.notify(Some(room_id), format!("{} finalized", room.title));

    Ok(ActionOutcome::ok("Room finalized"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector;
    use crate::rooms::{self, PositionDraft};
    use crate::settings::Settings;
    use caucus_core::{Database, ResolutionChoice, ResolutionFlow};

    fn setup() -> (AppState, Uuid) {
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
    fn test_finalize_destroys_working_records() {
        let (state, room_id) = setup();
        vote(&state, room_id, "Alice", 3);
        vote(&state, room_id, "Bob", 1);
        rooms::close_room(&state, room_id).unwrap();

        let outcome = finalize_room(&state, room_id, "hunter22").unwrap();
        assert!(outcome.success);

        let db = state.db.lock().unwrap();
        let room = db.rooms().find_by_id(room_id).unwrap().unwrap();
        assert!(room.is_finalized());
        assert!(room.finalized_at.is_some());

        assert_eq!(db.ballots().count_for_room(room_id).unwrap(), 0);
        assert_eq!(db.voters().count_for_room(room_id).unwrap(), 0);
        assert!(db.share_links().list_for_room(room_id).unwrap().is_empty());

        let snapshot = db.rooms().load_snapshot(room_id).unwrap().unwrap();
        assert_eq!(snapshot.total_ballots, 4);
        assert_eq!(snapshot.positions[0].winner.as_deref(), Some("Alice"));
        let alice = &snapshot.positions[0].candidates[0];
        assert_eq!(alice.vote_count, 3);
        assert!(alice.is_official_winner);
    }

    #[test]
    fn test_finalize_blocked_by_conflict() {
        let (state, room_id) = setup();
        vote(&state, room_id, "Alice", 2);
        vote(&state, room_id, "Bob", 2);
        rooms::close_room(&state, room_id).unwrap();

        let outcome = finalize_room(&state, room_id, "hunter22").unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("tie"));

        // Records untouched
        let db = state.db.lock().unwrap();
        assert_eq!(db.ballots().count_for_room(room_id).unwrap(), 4);
    }

    #[test]
    fn test_finalize_blocked_by_wrong_password() {
        let (state, room_id) = setup();
        vote(&state, room_id, "Alice", 1);
        rooms::close_room(&state, room_id).unwrap();

        let outcome = finalize_room(&state, room_id, "wrong").unwrap();
        assert!(!outcome.success);

        let db = state.db.lock().unwrap();
        assert!(!db.rooms().find_by_id(room_id).unwrap().unwrap().is_finalized());
    }

    #[test]
    fn test_finalize_requires_closed_room() {
        let (state, room_id) = setup();
        let result = finalize_room(&state, room_id, "hunter22");
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_double_finalize_rejected() {
        let (state, room_id) = setup();
        vote(&state, room_id, "Alice", 1);
        rooms::close_room(&state, room_id).unwrap();
        finalize_room(&state, room_id, "hunter22").unwrap();

        assert!(finalize_room(&state, room_id, "hunter22").is_err());
    }

    #[test]
    fn test_finalize_after_tie_resolution() {
        let (state, room_id) = setup();
        vote(&state, room_id, "Alice", 2);
        vote(&state, room_id, "Bob", 2);
        rooms::close_room(&state, room_id).unwrap();

        let mut flow = ResolutionFlow::new();
        let report =
            crate::resolutions::review_conflicts(&state, room_id, &mut flow).unwrap();
        let tie = &report.ties[0];
        crate::resolutions::select(
            &mut flow,
            ResolutionChoice::TieWinner {
                position_id: tie.position_id,
                candidate_id: tie.candidates[1].candidate_id,
            },
        )
        .unwrap();
        crate::resolutions::commit_resolution(&state, room_id, &mut flow, "hunter22").unwrap();

        let outcome = finalize_room(&state, room_id, "hunter22").unwrap();
        assert!(outcome.success);

        let db = state.db.lock().unwrap();
        let snapshot = db.rooms().load_snapshot(room_id).unwrap().unwrap();
        assert_eq!(snapshot.positions[0].winner.as_deref(), Some("Bob"));
    }
}
