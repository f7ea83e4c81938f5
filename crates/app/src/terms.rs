//! Term publishing
//!
//! After a room is finalized its winners can be published into the current
//! leadership term, which is what the public homepage renders. Republishing
//! a room replaces its entries instead of stacking duplicates.

use caucus_core::{Error, Result, Term, TermEntry};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::resolutions::ActionOutcome;
use crate::rooms::require_room;
use crate::state::AppState;

/// The current term and its published seats
#[derive(Debug, Clone)]
pub struct HomepageView {
    pub term: Term,
    pub entries: Vec<TermEntry>,
}

/// Start a new leadership term; it becomes the current one
#[instrument(skip(state))]
pub fn start_term(state: &AppState, label: &str) -> Result<Term> {
    state.require_admin()?;

    if label.trim().is_empty() {
        return Err(Error::InvalidOperation("term label is empty".to_string()));
    }

    let term = Term::new(label.to_string());
    let db = state.db.lock().unwrap();
    db.terms().create(&term)?;
    Ok(term)
}

/// Publish a finalized room's winners into the current term
#[instrument(skip(state))]
pub fn publish_results(state: &AppState, room_id: Uuid) -> Result<ActionOutcome> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if !room.is_finalized() {
        return Err(Error::InvalidOperation(
            "only a finalized room can be published".to_string(),
        ));
    }

    let term = db.terms().current()?.ok_or_else(|| {
        Error::InvalidOperation("no current term to publish into".to_string())
    })?;

    let snapshot = db
        .rooms()
        .load_snapshot(room_id)?
        .ok_or_else(|| Error::NotFound(format!("no snapshot for room {room_id}")))?;

    // Republishing replaces the room's previous entries
    db.terms().delete_entries_for_room(term.id, room_id)?;

    let winners = snapshot.winners();
    for (position_title, holder_name) in &winners {
        db.terms().add_entry(&TermEntry::new(
            term.id,
            room_id,
            position_title.to_string(),
            holder_name.to_string(),
        ))?;
    }
    drop(db);

    info!(%room_id, term = %term.label, seats = winners.len(), "results published");
    state.notify(
        Some(room_id),
        format!("{} published to {}", room.title, term.label),
    );

    Ok(ActionOutcome::ok(format!(
        "Published {} seat(s) to {}",
        winners.len(),
        term.label
    )))
}

/// The public homepage view: current term and its seats. None when no term
/// has been started yet.
#[instrument(skip(state))]
pub fn homepage(state: &AppState) -> Result<Option<HomepageView>> {
    let db = state.db.lock().unwrap();
    let Some(term) = db.terms().current()? else {
        return Ok(None);
    };
    let entries = db.terms().entries_for_term(term.id)?;
    Ok(Some(HomepageView { term, entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector;
    use crate::rooms::{self, PositionDraft};
    use crate::settings::Settings;
    use crate::{auth, finalize};
    use caucus_core::{Database, RoomKind};

    fn finalized_room(state: &AppState) -> Uuid {
        let room = rooms::create_room(
            state,
            "Board Election",
            None,
            RoomKind::Election,
            &[PositionDraft {
                title: "President".to_string(),
                candidates: vec!["Alice".to_string(), "Bob".to_string()],
            }],
        )
        .unwrap();
        rooms::open_room(state, room.id).unwrap();

        let (position_id, candidate_id) = {
            let db = state.db.lock().unwrap();
            let position = db.positions().list_for_room(room.id).unwrap().remove(0);
            let candidate = db
                .candidates()
                .find_by_name(position.id, "Alice")
                .unwrap()
                .unwrap();
            (position.id, candidate.id)
        };
        let link = rooms::issue_share_link(state, room.id, None).unwrap();
        let voter = rooms::join_via_link(state, &link.token, "v").unwrap();
        collector::cast_ballot(state, voter.id, position_id, candidate_id).unwrap();

        rooms::close_room(state, room.id).unwrap();
        finalize::finalize_room(state, room.id, "hunter22").unwrap();
        room.id
    }

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::with_database(db, Settings::default());
        auth::register(&state, "chair", "hunter22").unwrap();
        state
    }

    #[test]
    fn test_publish_to_current_term() {
        let state = test_state();
        let room_id = finalized_room(&state);
        start_term(&state, "2026 Board").unwrap();

        let outcome = publish_results(&state, room_id).unwrap();
        assert!(outcome.success);

        let view = homepage(&state).unwrap().unwrap();
        assert_eq!(view.term.label, "2026 Board");
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].position_title, "President");
        assert_eq!(view.entries[0].holder_name, "Alice");
    }

    #[test]
    fn test_republish_replaces_entries() {
        let state = test_state();
        let room_id = finalized_room(&state);
        start_term(&state, "2026 Board").unwrap();

        publish_results(&state, room_id).unwrap();
        publish_results(&state, room_id).unwrap();

        let view = homepage(&state).unwrap().unwrap();
        assert_eq!(view.entries.len(), 1);
    }

    #[test]
    fn test_publish_requires_finalized_room() {
        let state = test_state();
        start_term(&state, "2026 Board").unwrap();
        let room =
            rooms::create_room(&state, "Vote", None, RoomKind::Election, &[]).unwrap();

        assert!(publish_results(&state, room.id).is_err());
    }

    #[test]
    fn test_publish_requires_current_term() {
        let state = test_state();
        let room_id = finalized_room(&state);

        assert!(publish_results(&state, room_id).is_err());
    }

    #[test]
    fn test_homepage_empty_without_term() {
        let state = test_state();
        assert!(homepage(&state).unwrap().is_none());
    }

    #[test]
    fn test_new_term_takes_over_homepage() {
        let state = test_state();
        let room_id = finalized_room(&state);
        start_term(&state, "2025 Board").unwrap();
        publish_results(&state, room_id).unwrap();

        start_term(&state, "2026 Board").unwrap();
        let view = homepage(&state).unwrap().unwrap();
        assert_eq!(view.term.label, "2026 Board");
        assert!(view.entries.is_empty());
    }
}
