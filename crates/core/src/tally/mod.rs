//! Read-time tallying
//!
//! Vote counts and review averages are never stored; they are aggregated
//! from the raw ballot/review records on every read. Position and candidate
//! order follows insertion order so repeated reads render identically.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Candidate, Position};
use crate::storage::Database;

/// A candidate with its current tallies attached
#[derive(Debug, Clone)]
pub struct TalliedCandidate {
    pub candidate: Candidate,
    pub vote_count: u64,
    /// Mean star rating, review rooms only
    pub average_rating: Option<f64>,
}

/// A position with all candidates tallied
#[derive(Debug, Clone)]
pub struct TalliedPosition {
    pub position: Position,
    pub candidates: Vec<TalliedCandidate>,
}

impl TalliedPosition {
    /// Highest vote count among candidates not excluded by a forfeit
    pub fn top_vote_count(&self) -> u64 {
        self.eligible_candidates()
            .map(|c| c.vote_count)
            .max()
            .unwrap_or(0)
    }

    /// Candidates still in the running: a forfeited name no longer counts
    /// toward winner selection, though its record remains visible.
    pub fn eligible_candidates(&self) -> impl Iterator<Item = &TalliedCandidate> {
        let forfeited = self.position.forfeited_by_candidate_name.as_deref();
        self.candidates
            .iter()
            .filter(move |c| Some(c.candidate.name.as_str()) != forfeited)
    }

    /// All candidates sharing the top vote count, in array order.
    /// Empty when nobody has a vote yet: zero votes never wins.
    pub fn current_winners(&self) -> Vec<&TalliedCandidate> {
        let top = self.top_vote_count();
        if top == 0 {
            return Vec::new();
        }
        self.eligible_candidates()
            .filter(|c| c.vote_count == top)
            .collect()
    }
}

/// Tally every position in a room from the raw records
pub fn tally_room(db: &Database, room_id: Uuid) -> Result<Vec<TalliedPosition>> {
    let positions = db.positions().list_for_room(room_id)?;
    let mut tallied = Vec::with_capacity(positions.len());

    for position in positions {
        let candidates = db.candidates().list_for_position(position.id)?;
        let counts = db.ballots().counts_for_position(position.id)?;
        let averages = db.reviews().averages_for_position(position.id)?;

        let candidates = candidates
            .into_iter()
            .map(|candidate| {
                let vote_count = counts
                    .iter()
                    .find(|(id, _)| *id == candidate.id)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                let average_rating = averages
                    .iter()
                    .find(|(id, _)| *id == candidate.id)
                    .map(|(_, avg)| *avg);
                TalliedCandidate {
                    candidate,
                    vote_count,
                    average_rating,
                }
            })
            .collect();

        tallied.push(TalliedPosition {
            position,
            candidates,
        });
    }

    Ok(tallied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Position};

    fn tallied(position: Position, entries: Vec<(&str, u64)>) -> TalliedPosition {
        let candidates = entries
            .into_iter()
            .enumerate()
            .map(|(i, (name, votes))| TalliedCandidate {
                candidate: Candidate::new(position.id, name.to_string(), i as u32),
                vote_count: votes,
                average_rating: None,
            })
            .collect();
        TalliedPosition {
            position,
            candidates,
        }
    }

    #[test]
    fn test_top_vote_count() {
        let pos = Position::new(uuid::Uuid::new_v4(), "President".to_string(), 0);
        let tp = tallied(pos, vec![("Alice", 10), ("Bob", 3)]);
        assert_eq!(tp.top_vote_count(), 10);
    }

    #[test]
    fn test_no_winner_at_zero_votes() {
        let pos = Position::new(uuid::Uuid::new_v4(), "Secretary".to_string(), 0);
        let tp = tallied(pos, vec![("Alice", 0), ("Bob", 0)]);
        assert!(tp.current_winners().is_empty());
    }

    #[test]
    fn test_forfeited_name_excluded() {
        let mut pos = Position::new(uuid::Uuid::new_v4(), "Treasurer".to_string(), 0);
        pos.forfeited_by_candidate_name = Some("Alice".to_string());
        let tp = tallied(pos, vec![("Alice", 10), ("Bob", 7)]);

        let winners = tp.current_winners();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].candidate.name, "Bob");
        assert_eq!(tp.top_vote_count(), 7);
    }

    #[test]
    fn test_winners_follow_array_order() {
        let pos = Position::new(uuid::Uuid::new_v4(), "Auditor".to_string(), 0);
        let tp = tallied(pos, vec![("Carol", 5), ("Dan", 5), ("Eve", 2)]);
        let names: Vec<_> = tp
            .current_winners()
            .iter()
            .map(|c| c.candidate.name.as_str())
            .collect();
        assert_eq!(names, vec!["Carol", "Dan"]);
    }
}
