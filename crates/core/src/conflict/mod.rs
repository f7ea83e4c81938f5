//! Conflict detection for closed rooms
//!
//! Two conflict shapes block finalization: a tie inside one position, and
//! one person (matched by name) leading more than one position. Detection
//! is a pure scan over the tallied positions; nothing is stored. The report
//! is recomputed from scratch after every resolution mutation.

use uuid::Uuid;

use crate::tally::TalliedPosition;

/// A candidate at the top of a position's tally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopCandidate {
    pub candidate_id: Uuid,
    pub name: String,
    pub vote_count: u64,
}

/// Two or more candidates sharing a position's top vote count (> 0)
#[derive(Debug, Clone)]
pub struct Tie {
    pub position_id: Uuid,
    pub position_title: String,
    pub vote_count: u64,
    pub candidates: Vec<TopCandidate>,
}

/// A position a multi-winning name currently leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WonPosition {
    pub position_id: Uuid,
    pub position_title: String,
    pub candidate_id: Uuid,
}

/// One name among the top scorers of two or more positions
#[derive(Debug, Clone)]
pub struct MultiWin {
    pub name: String,
    pub positions: Vec<WonPosition>,
}

/// Everything blocking finalization of a room
#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    pub ties: Vec<Tie>,
    pub multi_wins: Vec<MultiWin>,
}

impl ConflictReport {
    pub fn all_resolved(&self) -> bool {
        self.ties.is_empty() && self.multi_wins.is_empty()
    }

    pub fn tie_for_position(&self, position_id: Uuid) -> Option<&Tie> {
        self.ties.iter().find(|t| t.position_id == position_id)
    }

    pub fn multi_win_for_name(&self, name: &str) -> Option<&MultiWin> {
        self.multi_wins.iter().find(|m| m.name == name)
    }
}

/// Scan tallied positions for ties and multi-position wins.
///
/// Positions that already have an official winner are skipped. A position
/// whose top vote count is zero has no winner and no conflict. Iteration
/// order follows the input arrays, so identical input yields an identical
/// report.
pub fn detect(positions: &[TalliedPosition]) -> ConflictReport {
    let mut ties = Vec::new();
    // First-seen order, keyed by candidate name
    let mut wins_by_name: Vec<(String, Vec<WonPosition>)> = Vec::new();

    for tp in positions {
        if tp.position.is_resolved() {
            continue;
        }

        let winners = tp.current_winners();
        if winners.is_empty() {
            continue;
        }

        if winners.len() > 1 {
            ties.push(Tie {
                position_id: tp.position.id,
                position_title: tp.position.title.clone(),
                vote_count: tp.top_vote_count(),
                candidates: winners
                    .iter()
                    .map(|c| TopCandidate {
                        candidate_id: c.candidate.id,
                        name: c.candidate.name.clone(),
                        vote_count: c.vote_count,
                    })
                    .collect(),
            });
        }

        // Every top scorer counts toward multi-win detection, tied or not
        for winner in winners {
            let won = WonPosition {
                position_id: tp.position.id,
                position_title: tp.position.title.clone(),
                candidate_id: winner.candidate.id,
            };
            match wins_by_name
                .iter_mut()
                .find(|(name, _)| *name == winner.candidate.name)
            {
                Some((_, positions)) => positions.push(won),
                None => wins_by_name.push((winner.candidate.name.clone(), vec![won])),
            }
        }
    }

    let multi_wins = wins_by_name
        .into_iter()
        .filter(|(_, positions)| positions.len() > 1)
        .map(|(name, positions)| MultiWin { name, positions })
        .collect();

    ConflictReport { ties, multi_wins }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Position};
    use crate::tally::TalliedCandidate;

    fn tallied(title: &str, entries: &[(&str, u64)]) -> TalliedPosition {
        let position = Position::new(Uuid::new_v4(), title.to_string(), 0);
        let candidates = entries
            .iter()
            .enumerate()
            .map(|(i, (name, votes))| TalliedCandidate {
                candidate: Candidate::new(position.id, name.to_string(), i as u32),
                vote_count: *votes,
                average_rating: None,
            })
            .collect();
        TalliedPosition {
            position,
            candidates,
        }
    }

    #[test]
    fn test_no_conflicts_on_clear_winners() {
        let positions = vec![
            tallied("President", &[("Alice", 10), ("Bob", 3)]),
            tallied("Secretary", &[("Carol", 7), ("Dan", 2)]),
        ];
        let report = detect(&positions);
        assert!(report.all_resolved());
    }

    #[test]
    fn test_zero_votes_is_not_a_tie() {
        let positions = vec![tallied("President", &[("Alice", 0), ("Bob", 0)])];
        let report = detect(&positions);
        assert!(report.ties.is_empty());
        assert!(report.multi_wins.is_empty());
    }

    #[test]
    fn test_strict_winner_not_in_ties() {
        let positions = vec![tallied("President", &[("Alice", 10), ("Bob", 9)])];
        let report = detect(&positions);
        assert!(report.ties.is_empty());
    }

    #[test]
    fn test_tie_reported_in_array_order() {
        let positions = vec![tallied(
            "President",
            &[("Alice", 10), ("Bob", 10), ("Carol", 3)],
        )];
        let report = detect(&positions);

        assert_eq!(report.ties.len(), 1);
        let tie = &report.ties[0];
        assert_eq!(tie.vote_count, 10);
        let names: Vec<_> = tie.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_multi_win_matches_by_name_across_ids() {
        // Different candidate records, same name, distinct positions
        let positions = vec![
            tallied("President", &[("Alice", 10), ("Bob", 4)]),
            tallied("Secretary", &[("Alice", 6), ("Carol", 2)]),
        ];
        let report = detect(&positions);

        assert_eq!(report.multi_wins.len(), 1);
        let mw = &report.multi_wins[0];
        assert_eq!(mw.name, "Alice");
        let titles: Vec<_> = mw
            .positions
            .iter()
            .map(|p| p.position_title.as_str())
            .collect();
        assert_eq!(titles, vec!["President", "Secretary"]);
    }

    #[test]
    fn test_tied_candidate_also_multi_wins() {
        // Alice ties in President and solely leads Secretary, so both
        // conflict types are present at once.
        let positions = vec![
            tallied("President", &[("Alice", 10), ("Bob", 10), ("Carol", 3)]),
            tallied("Secretary", &[("Alice", 10)]),
        ];
        let report = detect(&positions);

        assert_eq!(report.ties.len(), 1);
        assert_eq!(report.ties[0].position_title, "President");

        assert_eq!(report.multi_wins.len(), 1);
        let mw = &report.multi_wins[0];
        assert_eq!(mw.name, "Alice");
        assert_eq!(mw.positions.len(), 2);
        assert!(!report.all_resolved());
    }

    #[test]
    fn test_resolved_position_skipped() {
        let mut tp = tallied("President", &[("Alice", 10), ("Bob", 10)]);
        tp.position.official_winner_id = Some(tp.candidates[0].candidate.id);
        let report = detect(&[tp]);
        assert!(report.all_resolved());
    }

    #[test]
    fn test_forfeit_exposes_next_pair() {
        // After Alice forfeits President, Bob and Carol tie at 7
        let mut tp = tallied("President", &[("Alice", 10), ("Bob", 7), ("Carol", 7)]);
        tp.position.forfeited_by_candidate_name = Some("Alice".to_string());
        let report = detect(&[tp]);

        assert_eq!(report.ties.len(), 1);
        let names: Vec<_> = report.ties[0]
            .candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
    }

    #[test]
    fn test_report_lookup_helpers() {
        let positions = vec![
            tallied("President", &[("Alice", 5), ("Bob", 5)]),
            tallied("Secretary", &[("Bob", 5)]),
        ];
        let report = detect(&positions);

        let tie = report.tie_for_position(positions[0].position.id);
        assert!(tie.is_some());
        assert!(report.multi_win_for_name("Bob").is_some());
        assert!(report.multi_win_for_name("Alice").is_none());
    }

    #[test]
    fn test_deterministic_on_rerun() {
        let positions = vec![
            tallied("President", &[("Alice", 4), ("Bob", 4)]),
            tallied("Secretary", &[("Alice", 4), ("Carol", 4)]),
        ];
        let a = detect(&positions);
        let b = detect(&positions);
        assert_eq!(a.ties.len(), b.ties.len());
        assert_eq!(
            a.multi_wins.iter().map(|m| &m.name).collect::<Vec<_>>(),
            b.multi_wins.iter().map(|m| &m.name).collect::<Vec<_>>()
        );
    }
}
