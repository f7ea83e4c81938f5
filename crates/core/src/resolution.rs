//! Conflict resolution flow for a room's results page
//!
//! Tracks where an administrator is in the resolve cycle. This is
//! state-only: the actual mutations and password check live in the service
//! layer, which reports outcomes back into the flow.
//!
//! `NoConflict -> ConflictsPresent -> ResolutionChosen ->
//! PasswordConfirmPending -> (commit, re-detect) -> ConflictsPresent | NoConflict`

use uuid::Uuid;

use crate::conflict::ConflictReport;
use crate::error::{Error, Result};

/// What the administrator picked for one conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionChoice {
    /// Tie: exactly one candidate from the tied set wins the position
    TieWinner {
        position_id: Uuid,
        candidate_id: Uuid,
    },
    /// Multi-win: the chosen position is the person's real seat; their
    /// entries everywhere else in the conflict set are forfeited
    RealPosition { name: String, position_id: Uuid },
    /// Tie: one of the tied names steps aside instead of winning
    Forfeit { position_id: Uuid, name: String },
}

/// Where the administrator is in the resolve cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    NoConflict,
    ConflictsPresent,
    ResolutionChosen,
    PasswordConfirmPending,
}

/// Resolution flow state for one room's results page
#[derive(Debug, Clone)]
pub struct ResolutionFlow {
    state: FlowState,
    choice: Option<ResolutionChoice>,
}

impl ResolutionFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::NoConflict,
            choice: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn chosen(&self) -> Option<&ResolutionChoice> {
        self.choice.as_ref()
    }

    /// Sync the flow with a freshly detected report
    pub fn review(&mut self, report: &ConflictReport) {
        self.choice = None;
        self.state = if report.all_resolved() {
            FlowState::NoConflict
        } else {
            FlowState::ConflictsPresent
        };
    }

    /// Record the administrator's selection.
    /// Submitting without a selection never reaches this point in the UI;
    /// calling it from the wrong state is a programming error surfaced as
    /// `InvalidOperation`.
    pub fn choose(&mut self, choice: ResolutionChoice) -> Result<()> {
        if self.state != FlowState::ConflictsPresent && self.state != FlowState::ResolutionChosen {
            return Err(Error::InvalidOperation(
                "no conflict selected for resolution".into(),
            ));
        }
        self.choice = Some(choice);
        self.state = FlowState::ResolutionChosen;
        Ok(())
    }

    /// Move to the password confirmation step, yielding the pending choice
    pub fn request_confirmation(&mut self) -> Result<ResolutionChoice> {
        let choice = self.choice.clone().ok_or_else(|| {
            Error::InvalidOperation("cannot confirm: nothing selected".into())
        })?;
        self.state = FlowState::PasswordConfirmPending;
        Ok(choice)
    }

    /// Password check failed: stay on the same choice, let the admin retry
    pub fn password_rejected(&mut self) {
        if self.state == FlowState::PasswordConfirmPending {
            self.state = FlowState::ResolutionChosen;
        }
    }

    /// Commit succeeded and the detector was re-run; loop on the new report
    pub fn committed(&mut self, report: &ConflictReport) {
        self.review(report);
    }
}

impl Default for ResolutionFlow {
    fn default() -> Self {
        Self::new()
    }
}
