//! Caucus Core Library
//!
//! Core models, tallying, conflict detection, resolution flow, and storage
//! for the Caucus election and review platform.

pub mod conflict;
pub mod error;
pub mod invariants;
pub mod models;
pub mod resolution;
pub mod storage;
pub mod tally;

pub use conflict::{ConflictReport, MultiWin, Tie, TopCandidate, WonPosition};
pub use error::{Error, Result};
pub use models::*;
pub use resolution::{FlowState, ResolutionChoice, ResolutionFlow};
pub use storage::{
    AdminPreferences, AdminRepository, Database, PreferencesStore, RoomRepository, Storage,
    SubmissionRepository, TermRepository,
};
pub use tally::{tally_room, TalliedCandidate, TalliedPosition};
