//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Administrator accounts
            CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            );

            -- Sessions table
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                admin_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY (admin_id) REFERENCES admins(id) ON DELETE CASCADE
            );

            -- Rooms table
            CREATE TABLE IF NOT EXISTS rooms (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                kind TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                finalized_at TEXT,
                -- Frozen results summary, written once at finalize time
                finalized_results TEXT,
                FOREIGN KEY (created_by) REFERENCES admins(id)
            );

            -- Positions table
            CREATE TABLE IF NOT EXISTS positions (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                title TEXT NOT NULL,
                ord INTEGER NOT NULL,
                official_winner_id TEXT,
                forfeited_by_candidate_name TEXT,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE
            );

            -- Candidates table
            CREATE TABLE IF NOT EXISTS candidates (
                id TEXT PRIMARY KEY,
                position_id TEXT NOT NULL,
                name TEXT NOT NULL,
                ord INTEGER NOT NULL,
                is_official_winner INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (position_id) REFERENCES positions(id) ON DELETE CASCADE
            );

            -- Voters table (working records, destroyed at finalize)
            CREATE TABLE IF NOT EXISTS voters (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                joined_at TEXT NOT NULL,
                has_submitted INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE
            );

            -- Ballots table (working records, destroyed at finalize)
            CREATE TABLE IF NOT EXISTS ballots (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                position_id TEXT NOT NULL,
                candidate_id TEXT NOT NULL,
                voter_id TEXT NOT NULL,
                cast_at TEXT NOT NULL,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE,
                FOREIGN KEY (position_id) REFERENCES positions(id) ON DELETE CASCADE,
                FOREIGN KEY (candidate_id) REFERENCES candidates(id) ON DELETE CASCADE,
                FOREIGN KEY (voter_id) REFERENCES voters(id) ON DELETE CASCADE,
                UNIQUE(voter_id, position_id)
            );

            -- Reviews table (working records, destroyed at finalize)
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                candidate_id TEXT NOT NULL,
                reviewer_id TEXT NOT NULL,
                rating INTEGER NOT NULL,
                comment TEXT,
                submitted_at TEXT NOT NULL,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE,
                FOREIGN KEY (candidate_id) REFERENCES candidates(id) ON DELETE CASCADE,
                FOREIGN KEY (reviewer_id) REFERENCES voters(id) ON DELETE CASCADE,
                UNIQUE(reviewer_id, candidate_id)
            );

            -- Share links table
            CREATE TABLE IF NOT EXISTS share_links (
                id TEXT PRIMARY KEY,
                room_id TEXT NOT NULL,
                token TEXT NOT NULL UNIQUE,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT,
                max_uses INTEGER,
                use_count INTEGER NOT NULL DEFAULT 0,
                is_revoked INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE,
                FOREIGN KEY (created_by) REFERENCES admins(id)
            );

            -- Leadership terms for the public homepage
            CREATE TABLE IF NOT EXISTS terms (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                started_at TEXT NOT NULL,
                is_current INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS term_entries (
                id TEXT PRIMARY KEY,
                term_id TEXT NOT NULL,
                room_id TEXT NOT NULL,
                position_title TEXT NOT NULL,
                holder_name TEXT NOT NULL,
                published_at TEXT NOT NULL,
                FOREIGN KEY (term_id) REFERENCES terms(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            -- Session indexes
            CREATE INDEX IF NOT EXISTS idx_sessions_admin ON sessions(admin_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);

            -- Room content indexes
            CREATE INDEX IF NOT EXISTS idx_positions_room ON positions(room_id);
            CREATE INDEX IF NOT EXISTS idx_candidates_position ON candidates(position_id);
            CREATE INDEX IF NOT EXISTS idx_voters_room ON voters(room_id);

            -- Tally indexes
            CREATE INDEX IF NOT EXISTS idx_ballots_room ON ballots(room_id);
            CREATE INDEX IF NOT EXISTS idx_ballots_position ON ballots(position_id);
            CREATE INDEX IF NOT EXISTS idx_ballots_candidate ON ballots(candidate_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_room ON reviews(room_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_candidate ON reviews(candidate_id);

            -- Share link indexes
            CREATE INDEX IF NOT EXISTS idx_share_links_token ON share_links(token);
            CREATE INDEX IF NOT EXISTS idx_share_links_room ON share_links(room_id);

            -- Term indexes
            CREATE INDEX IF NOT EXISTS idx_term_entries_term ON term_entries(term_id);
            CREATE INDEX IF NOT EXISTS idx_term_entries_room ON term_entries(room_id);
        "#,
    },
    Migration {
        version: 3,
        description: "Add per-admin preferences",
        sql: r#"
            -- Admin preferences (last room, notification toggle)
            CREATE TABLE IF NOT EXISTS admin_preferences (
                admin_id TEXT PRIMARY KEY,
                last_room_id TEXT,
                notifications_enabled INTEGER NOT NULL DEFAULT 1,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (admin_id) REFERENCES admins(id) ON DELETE CASCADE
            );
        "#,
    },
];

/// Initialize the migrations table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .unwrap_or(None);
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    info!(current_version, "Checking for pending migrations");

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                description = migration.description,
                "Applying migration"
            );

            conn.execute_batch(migration.sql)?;
            record_migration(conn, migration)?;

            info!(version = migration.version, "Migration complete");
        }
    }

    let new_version = get_current_version(conn)?;
    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}
