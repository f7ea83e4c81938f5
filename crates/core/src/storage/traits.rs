//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future network backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Admin, Ballot, Candidate, FinalizedResults, Position, Review, Room, RoomStatus, Session,
    ShareLink, Term, TermEntry, Voter,
};

/// Administrator repository operations
pub trait AdminRepository {
    /// Create a new administrator
    fn create_admin(&self, admin: &Admin) -> Result<()>;

    /// Find administrator by ID
    fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>>;

    /// Find administrator by username
    fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>>;

    /// Update administrator's last login time
    fn update_last_login(&self, admin_id: Uuid) -> Result<()>;

    /// Create a session
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Find a valid (non-expired) session
    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Delete a session
    fn delete_session(&self, session_id: Uuid) -> Result<()>;

    /// Delete all sessions for an administrator
    fn delete_admin_sessions(&self, admin_id: Uuid) -> Result<()>;

    /// Clean up expired sessions
    fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// Room repository operations, including positions and candidates
pub trait RoomRepository {
    /// Create a new room
    fn create_room(&self, room: &Room) -> Result<()>;

    /// Find room by ID
    fn find_room_by_id(&self, id: Uuid) -> Result<Option<Room>>;

    /// Update a room
    fn update_room(&self, room: &Room) -> Result<()>;

    /// Delete a room
    fn delete_room(&self, room_id: Uuid) -> Result<()>;

    /// List all rooms created by an administrator
    fn list_rooms_for_admin(&self, admin_id: Uuid) -> Result<Vec<Room>>;

    /// Update room status
    fn set_room_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()>;

    /// Finalize a room: write the snapshot and destroy working records
    fn finalize_room(&self, room_id: Uuid, snapshot: &FinalizedResults) -> Result<()>;

    /// Load the frozen results snapshot, if finalized
    fn load_room_snapshot(&self, room_id: Uuid) -> Result<Option<FinalizedResults>>;

    /// Create a position
    fn create_position(&self, position: &Position) -> Result<()>;

    /// List positions for a room in insertion order
    fn list_positions_for_room(&self, room_id: Uuid) -> Result<Vec<Position>>;

    /// Mark a position's official winner
    fn set_official_winner(&self, position_id: Uuid, candidate_id: Uuid) -> Result<()>;

    /// Create a candidate
    fn create_candidate(&self, candidate: &Candidate) -> Result<()>;

    /// List candidates for a position in insertion order
    fn list_candidates_for_position(&self, position_id: Uuid) -> Result<Vec<Candidate>>;
}

/// Submission repository operations: ballots, reviews, voters, share links
pub trait SubmissionRepository {
    /// Record a vote
    fn cast_ballot(&self, ballot: &Ballot) -> Result<()>;

    /// Record a star rating
    fn submit_review(&self, review: &Review) -> Result<()>;

    /// Register a participant
    fn register_voter(&self, voter: &Voter) -> Result<()>;

    /// Find a participant by ID
    fn find_voter_by_id(&self, id: Uuid) -> Result<Option<Voter>>;

    /// Create a share link
    fn create_share_link(&self, link: &ShareLink) -> Result<()>;

    /// Find share link by token
    fn find_share_link_by_token(&self, token: &str) -> Result<Option<ShareLink>>;

    /// Increment share link use count
    fn increment_use_count(&self, link_id: Uuid) -> Result<()>;

    /// Revoke a share link
    fn revoke_share_link(&self, link_id: Uuid) -> Result<()>;
}

/// Leadership term repository operations
pub trait TermRepository {
    /// Create a term
    fn create_term(&self, term: &Term) -> Result<()>;

    /// Get the current term, if any
    fn current_term(&self) -> Result<Option<Term>>;

    /// Add an entry to a term
    fn add_term_entry(&self, entry: &TermEntry) -> Result<()>;

    /// List a term's entries
    fn list_term_entries(&self, term_id: Uuid) -> Result<Vec<TermEntry>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage: AdminRepository + RoomRepository + SubmissionRepository + TermRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: AdminRepository + RoomRepository + SubmissionRepository + TermRepository
{
}
