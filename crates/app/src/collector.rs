//! Ballot and review collection
//!
//! Submissions arrive from participants who joined through a share link.
//! Every write re-checks the room status: a link that was valid at join
//! time stops working the moment the room closes.

use caucus_core::{Ballot, Error, Result, Review, Room, RoomKind, Voter};
use tracing::instrument;
use uuid::Uuid;

use crate::rooms::require_room;
use crate::state::AppState;

fn require_voter(db: &caucus_core::Database, voter_id: Uuid) -> Result<Voter> {
    db.voters()
        .find_by_id(voter_id)?
        .ok_or_else(|| Error::NotFound(format!("voter {voter_id}")))
}

fn require_accepting(room: &Room, kind: RoomKind) -> Result<()> {
    if !room.status.accepts_submissions() {
        return Err(Error::InvalidOperation(
            "room is not accepting submissions".to_string(),
        ));
    }
    if room.kind != kind {
        return Err(Error::InvalidOperation(match kind {
            RoomKind::Election => "ballots can only be cast in election rooms".to_string(),
            RoomKind::Review => "reviews can only be submitted in review rooms".to_string(),
        }));
    }
    Ok(())
}

/// Cast a vote for one candidate in one position
#[instrument(skip(state))]
pub fn cast_ballot(
    state: &AppState,
    voter_id: Uuid,
    position_id: Uuid,
    candidate_id: Uuid,
) -> Result<()> {
    let db = state.db.lock().unwrap();

    let voter = require_voter(&db, voter_id)?;
    let room = require_room(&db, voter.room_id)?;
    require_accepting(&room, RoomKind::Election)?;

    let position = db
        .positions()
        .find_by_id(position_id)?
        .ok_or_else(|| Error::NotFound(format!("position {position_id}")))?;
    if position.room_id != room.id {
        return Err(Error::InvalidOperation(
            "position belongs to a different room".to_string(),
        ));
    }

    db.ballots()
        .cast(&Ballot::new(room.id, position_id, candidate_id, voter_id))
}

/// Submit a star rating for one candidate
#[instrument(skip(state, comment))]
pub fn submit_review(
    state: &AppState,
    voter_id: Uuid,
    candidate_id: Uuid,
    rating: u8,
    comment: Option<String>,
) -> Result<()> {
    let db = state.db.lock().unwrap();

    let voter = require_voter(&db, voter_id)?;
    let room = require_room(&db, voter.room_id)?;
    require_accepting(&room, RoomKind::Review)?;

    let mut review = Review::new(room.id, candidate_id, voter_id, rating);
    if let Some(comment) = comment {
        review = review.with_comment(comment);
    }

    db.reviews().submit(&review)
}

/// Mark a participant's submission complete
#[instrument(skip(state))]
pub fn complete_submission(state: &AppState, voter_id: Uuid) -> Result<()> {
    let db = state.db.lock().unwrap();
    require_voter(&db, voter_id)?;
    db.voters().mark_submitted(voter_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::rooms::{self, PositionDraft};
    use crate::settings::Settings;
    use caucus_core::Database;

    struct Fixture {
        state: AppState,
        room_id: Uuid,
        position_id: Uuid,
        candidate_id: Uuid,
    }

    fn setup(kind: RoomKind) -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::with_database(db, Settings::default());
        auth::register(&state, "chair", "hunter22").unwrap();

        let room = rooms::create_room(
            &state,
            "Vote",
            None,
            kind,
            &[PositionDraft {
                title: "President".to_string(),
                candidates: vec!["Alice".to_string(), "Bob".to_string()],
            }],
        )
        .unwrap();
        rooms::open_room(&state, room.id).unwrap();

        let (position_id, candidate_id) = {
            let db = state.db.lock().unwrap();
            let position = db.positions().list_for_room(room.id).unwrap().remove(0);
            let candidate = db
                .candidates()
                .list_for_position(position.id)
                .unwrap()
                .remove(0);
            (position.id, candidate.id)
        };

        Fixture {
            state,
            room_id: room.id,
            position_id,
            candidate_id,
        }
    }

    fn join(fx: &Fixture, name: &str) -> Uuid {
        let link = rooms::issue_share_link(&fx.state, fx.room_id, None).unwrap();
        rooms::join_via_link(&fx.state, &link.token, name).unwrap().id
    }

    #[test]
    fn test_cast_ballot() {
        let fx = setup(RoomKind::Election);
        let voter = join(&fx, "Dana");

        cast_ballot(&fx.state, voter, fx.position_id, fx.candidate_id).unwrap();
        complete_submission(&fx.state, voter).unwrap();

        let db = fx.state.db.lock().unwrap();
        assert_eq!(db.ballots().count_for_room(fx.room_id).unwrap(), 1);
        assert!(db.voters().find_by_id(voter).unwrap().unwrap().has_submitted);
    }

    #[test]
    fn test_ballot_rejected_after_close() {
        let fx = setup(RoomKind::Election);
        let voter = join(&fx, "Dana");
        rooms::close_room(&fx.state, fx.room_id).unwrap();

        let result = cast_ballot(&fx.state, voter, fx.position_id, fx.candidate_id);
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_ballot_rejected_in_review_room() {
        let fx = setup(RoomKind::Review);
        let voter = join(&fx, "Dana");

        let result = cast_ballot(&fx.state, voter, fx.position_id, fx.candidate_id);
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_review_with_comment() {
        let fx = setup(RoomKind::Review);
        let voter = join(&fx, "Dana");

        submit_review(
            &fx.state,
            voter,
            fx.candidate_id,
            4,
            Some("solid work".to_string()),
        )
        .unwrap();

        let db = fx.state.db.lock().unwrap();
        assert_eq!(db.reviews().count_for_room(fx.room_id).unwrap(), 1);
    }

    #[test]
    fn test_review_rejected_in_election_room() {
        let fx = setup(RoomKind::Election);
        let voter = join(&fx, "Dana");

        assert!(submit_review(&fx.state, voter, fx.candidate_id, 4, None).is_err());
    }

    #[test]
    fn test_unknown_voter_rejected() {
        let fx = setup(RoomKind::Election);
        let result = cast_ballot(&fx.state, Uuid::new_v4(), fx.position_id, fx.candidate_id);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
