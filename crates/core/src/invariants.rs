//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::conflict::ConflictReport;
use crate::models::{Position, Review, Room, RoomStatus};
use crate::tally::TalliedPosition;

/// Validate that a room's state is internally consistent
pub fn assert_room_invariants(room: &Room) {
    // finalized_at is set exactly when the room reached Finalized
    debug_assert!(
        (room.status == RoomStatus::Finalized) == room.finalized_at.is_some(),
        "Room {} has status {:?} but finalized_at {:?}",
        room.id,
        room.status,
        room.finalized_at
    );

    // Title must not be empty
    debug_assert!(
        !room.title.trim().is_empty(),
        "Room {} has empty title",
        room.id
    );
}

/// Validate that a position's resolution state is consistent
pub fn assert_position_invariants(position: &Position) {
    debug_assert!(
        position.room_id != Uuid::nil(),
        "Position {} has nil room_id",
        position.id
    );

    // A forfeit marks a name, never a winner
    if let Some(name) = &position.forfeited_by_candidate_name {
        debug_assert!(
            !name.trim().is_empty(),
            "Position {} has empty forfeit name",
            position.id
        );
    }
}

/// Validate that a review rating is inside the accepted range
pub fn assert_review_invariants(review: &Review) {
    debug_assert!(
        review.rating_in_range(),
        "Review {} carries rating {} outside 1..=5",
        review.id,
        review.rating
    );
}

/// Validate that a tally is consistent with the positions it covers
pub fn assert_tally_invariants(tallies: &[TalliedPosition]) {
    for tally in tallies {
        // A candidate with zero votes must never be reported as leading
        let winners = tally.current_winners();
        debug_assert!(
            winners.iter().all(|w| w.vote_count > 0),
            "Position {} reports a leader with zero votes",
            tally.position.id
        );

        // Every reported leader shares the same top count
        if let Some(first) = winners.first() {
            debug_assert!(
                winners.iter().all(|w| w.vote_count == first.vote_count),
                "Position {} reports leaders with differing counts",
                tally.position.id
            );
        }
    }
}

/// Validate that a conflict report never flags a resolved position
pub fn assert_conflict_report_invariants(report: &ConflictReport, positions: &[Position]) {
    for tie in &report.ties {
        let resolved = positions
            .iter()
            .any(|p| p.id == tie.position_id && p.is_resolved());
        debug_assert!(
            !resolved,
            "Resolved position {} flagged as tied",
            tie.position_id
        );

        debug_assert!(
            tie.candidates.len() >= 2,
            "Tie on position {} with fewer than two candidates",
            tie.position_id
        );
        debug_assert!(
            tie.vote_count > 0,
            "Tie on position {} at zero votes",
            tie.position_id
        );
    }

    for multi_win in &report.multi_wins {
        debug_assert!(
            multi_win.positions.len() >= 2,
            "Multi-win for {} spans fewer than two positions",
            multi_win.name
        );
    }
}

/// Validate that an admin ID is not nil
pub fn assert_admin_id_valid(admin_id: Uuid, context: &str) {
    debug_assert!(
        admin_id != Uuid::nil(),
        "Nil admin_id in context: {}",
        context
    );
}
