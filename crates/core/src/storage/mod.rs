//! SQLite storage layer for Caucus

mod admins;
mod ballots;
mod candidates;
mod migrations;
mod parse;
mod positions;
mod preferences;
mod reviews;
mod rooms;
mod share_links;
mod terms;
mod traits;
mod voters;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Admin, Ballot, Candidate, FinalizedResults, Position, Review, Room, RoomStatus, Session,
    ShareLink, Term, TermEntry, Voter,
};
use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

pub use admins::AdminStore;
pub use ballots::BallotStore;
pub use candidates::CandidateStore;
pub use positions::PositionStore;
pub use preferences::{AdminPreferences, PreferencesStore};
pub use reviews::ReviewStore;
pub use rooms::RoomStore;
pub use share_links::ShareLinkStore;
pub use terms::TermStore;
pub use traits::{
    AdminRepository, RoomRepository, Storage, SubmissionRepository, TermRepository,
};
pub use voters::VoterStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get administrator store
    pub fn admins(&self) -> AdminStore<'_> {
        AdminStore::new(&self.conn)
    }

    /// Get room store
    pub fn rooms(&self) -> RoomStore<'_> {
        RoomStore::new(&self.conn)
    }

    /// Get position store
    pub fn positions(&self) -> PositionStore<'_> {
        PositionStore::new(&self.conn)
    }

    /// Get candidate store
    pub fn candidates(&self) -> CandidateStore<'_> {
        CandidateStore::new(&self.conn)
    }

    /// Get ballot store
    pub fn ballots(&self) -> BallotStore<'_> {
        BallotStore::new(&self.conn)
    }

    /// Get review store
    pub fn reviews(&self) -> ReviewStore<'_> {
        ReviewStore::new(&self.conn)
    }

    /// Get voter store
    pub fn voters(&self) -> VoterStore<'_> {
        VoterStore::new(&self.conn)
    }

    /// Get share link store
    pub fn share_links(&self) -> ShareLinkStore<'_> {
        ShareLinkStore::new(&self.conn)
    }

    /// Get term store
    pub fn terms(&self) -> TermStore<'_> {
        TermStore::new(&self.conn)
    }

    /// Get preferences store for admin settings
    pub fn preferences(&self) -> PreferencesStore<'_> {
        PreferencesStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl AdminRepository for Database {
    fn create_admin(&self, admin: &Admin) -> Result<()> {
        self.admins().create(admin)
    }

    fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>> {
        self.admins().find_by_id(id)
    }

    fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        self.admins().find_by_username(username)
    }

    fn update_last_login(&self, admin_id: Uuid) -> Result<()> {
        self.admins().update_last_login(admin_id)
    }

    fn create_session(&self, session: &Session) -> Result<()> {
        self.admins().create_session(session)
    }

    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.admins().find_valid_session(session_id)
    }

    fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.admins().delete_session(session_id)
    }

    fn delete_admin_sessions(&self, admin_id: Uuid) -> Result<()> {
        self.admins().delete_admin_sessions(admin_id)
    }

    fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.admins().cleanup_expired_sessions()
    }
}

impl RoomRepository for Database {
    fn create_room(&self, room: &Room) -> Result<()> {
        self.rooms().create(room)
    }

    fn find_room_by_id(&self, id: Uuid) -> Result<Option<Room>> {
        self.rooms().find_by_id(id)
    }

    fn update_room(&self, room: &Room) -> Result<()> {
        self.rooms().update(room)
    }

    fn delete_room(&self, room_id: Uuid) -> Result<()> {
        self.rooms().delete(room_id)
    }

    fn list_rooms_for_admin(&self, admin_id: Uuid) -> Result<Vec<Room>> {
        self.rooms().list_for_admin(admin_id)
    }

    fn set_room_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()> {
        self.rooms().set_status(room_id, status)
    }

    fn finalize_room(&self, room_id: Uuid, snapshot: &FinalizedResults) -> Result<()> {
        self.rooms().finalize(room_id, snapshot)
    }

    fn load_room_snapshot(&self, room_id: Uuid) -> Result<Option<FinalizedResults>> {
        self.rooms().load_snapshot(room_id)
    }

    fn create_position(&self, position: &Position) -> Result<()> {
        self.positions().create(position)
    }

    fn list_positions_for_room(&self, room_id: Uuid) -> Result<Vec<Position>> {
        self.positions().list_for_room(room_id)
    }

    fn set_official_winner(&self, position_id: Uuid, candidate_id: Uuid) -> Result<()> {
        self.positions().set_official_winner(position_id, candidate_id)
    }

    fn create_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.candidates().create(candidate)
    }

    fn list_candidates_for_position(&self, position_id: Uuid) -> Result<Vec<Candidate>> {
        self.candidates().list_for_position(position_id)
    }
}

impl SubmissionRepository for Database {
    fn cast_ballot(&self, ballot: &Ballot) -> Result<()> {
        self.ballots().cast(ballot)
    }

    fn submit_review(&self, review: &Review) -> Result<()> {
        self.reviews().submit(review)
    }

    fn register_voter(&self, voter: &Voter) -> Result<()> {
        self.voters().register(voter)
    }

    fn find_voter_by_id(&self, id: Uuid) -> Result<Option<Voter>> {
        self.voters().find_by_id(id)
    }

    fn create_share_link(&self, link: &ShareLink) -> Result<()> {
        self.share_links().create(link)
    }

    fn find_share_link_by_token(&self, token: &str) -> Result<Option<ShareLink>> {
        self.share_links().find_by_token(token)
    }

    fn increment_use_count(&self, link_id: Uuid) -> Result<()> {
        self.share_links().increment_use_count(link_id)
    }

    fn revoke_share_link(&self, link_id: Uuid) -> Result<()> {
        self.share_links().revoke(link_id)
    }
}

impl TermRepository for Database {
    fn create_term(&self, term: &Term) -> Result<()> {
        self.terms().create(term)
    }

    fn current_term(&self) -> Result<Option<Term>> {
        self.terms().current()
    }

    fn add_term_entry(&self, entry: &TermEntry) -> Result<()> {
        self.terms().add_entry(entry)
    }

    fn list_term_entries(&self, term_id: Uuid) -> Result<Vec<TermEntry>> {
        self.terms().entries_for_term(term_id)
    }
}
