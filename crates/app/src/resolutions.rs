//! Conflict resolution services
//!
//! Drives the resolve cycle on a closed room: review the report, record the
//! administrator's choice, demand their password again, commit the fix, and
//! re-run the detector. One conflict is settled per pass; the loop repeats
//! until the report comes back clean.

use caucus_core::{
    conflict, tally_room, ConflictReport, Error, Result, ResolutionChoice, ResolutionFlow,
    RoomStatus,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth;
use crate::rooms::require_room;
use crate::state::AppState;

/// Outcome of a password-gated action, shaped for direct display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Detect conflicts on a closed room and sync the flow with the report
#[instrument(skip(state, flow))]
pub fn review_conflicts(
    state: &AppState,
    room_id: Uuid,
    flow: &mut ResolutionFlow,
) -> Result<ConflictReport> {
    state.require_admin()?;

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status != RoomStatus::Closed {
        return Err(Error::InvalidOperation(
            "conflicts are only reviewed on a closed room".to_string(),
        ));
    }

    let tallies = tally_room(&db, room_id)?;
    let report = conflict::detect(&tallies);
    drop(db);

    flow.review(&report);
    Ok(report)
}

/// Record the administrator's pick for one conflict
pub fn select(flow: &mut ResolutionFlow, choice: ResolutionChoice) -> Result<()> {
    flow.choose(choice)
}

/// Commit the selected resolution after re-checking the password.
///
/// A wrong password keeps the selection and reports failure; a committed
/// fix re-runs the detector, so the caller sees immediately whether the
/// fix exposed a new conflict.
#[instrument(skip(state, flow, password))]
pub fn commit_resolution(
    state: &AppState,
    room_id: Uuid,
    flow: &mut ResolutionFlow,
    password: &str,
) -> Result<ActionOutcome> {
    let choice = flow.request_confirmation()?;

    if !auth::reauthenticate(state, password)? {
        flow.password_rejected();
        warn!(%room_id, "resolution rejected: password mismatch");
        return Ok(ActionOutcome::failed("Incorrect password"));
    }

    let db = state.db.lock().unwrap();
    let room = require_room(&db, room_id)?;
    if room.status != RoomStatus::Closed {
        return Err(Error::InvalidOperation(
            "resolutions apply only to a closed room".to_string(),
        ));
    }

    // Work from a fresh report: the selection may predate another commit
    let tallies = tally_room(&db, room_id)?;
    let report = conflict::detect(&tallies);

    match &choice {
        ResolutionChoice::TieWinner {
            position_id,
            candidate_id,
        } => {
            let Some(tie) = report.tie_for_position(*position_id) else {
                drop(db);
                flow.committed(&report);
                return Ok(ActionOutcome::failed("That tie is no longer present"));
            };
            if !tie.candidates.iter().any(|c| c.candidate_id == *candidate_id) {
                drop(db);
                flow.committed(&report);
                return Ok(ActionOutcome::failed(
                    "That candidate is no longer part of the tie",
                ));
            }
            db.positions()
                .set_official_winner(*position_id, *candidate_id)?;
            info!(%position_id, %candidate_id, "tie resolved");
        }
        ResolutionChoice::RealPosition { name, position_id } => {
            let Some(multi_win) = report.multi_win_for_name(name) else {
                drop(db);
                flow.committed(&report);
                return Ok(ActionOutcome::failed("That conflict is no longer present"));
            };
            let Some(kept) = multi_win
                .positions
                .iter()
                .find(|p| p.position_id == *position_id)
            else {
                drop(db);
                flow.committed(&report);
                return Ok(ActionOutcome::failed(
                    "That position is no longer part of the conflict",
                ));
            };

            let forfeits: Vec<Uuid> = multi_win
                .positions
                .iter()
                .filter(|p| p.position_id != *position_id)
                .map(|p| p.position_id)
                .collect();

            db.positions()
                .resolve_multi_win(*position_id, kept.candidate_id, name, &forfeits)?;
            info!(%name, kept = %position_id, forfeited = forfeits.len(), "multi-win resolved");
        }
        ResolutionChoice::Forfeit { position_id, name } => {
            let Some(tie) = report.tie_for_position(*position_id) else {
                drop(db);
                flow.committed(&report);
                return Ok(ActionOutcome::failed("That tie is no longer present"));
            };
            if !tie.candidates.iter().any(|c| c.name == *name) {
                drop(db);
                flow.committed(&report);
                return Ok(ActionOutcome::failed(
                    "That candidate is no longer part of the tie",
                ));
            }
            db.positions().record_forfeit(*position_id, name)?;
            info!(%position_id, %name, "tie resolved by forfeit");
        }
    }

    // Re-detect: the fix may have produced a new conflict
    let tallies = tally_room(&db, room_id)?;
    let report = conflict::detect(&tallies);
    drop(db);

    flow.committed(&report);

    Ok(if report.all_resolved() {
        ActionOutcome::ok("Resolution applied; no conflicts remain")
    } else {
        ActionOutcome::ok("Resolution applied; further conflicts remain")
    })
}
