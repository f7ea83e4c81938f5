//! Administrator authentication
//!
//! Passwords are stored as argon2 hashes. The same verification path backs
//! both login and the re-authentication gate guarding resolutions and
//! finalization.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use caucus_core::{Admin, Error, Result, Session};
use tracing::instrument;

use crate::state::AppState;

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| Error::Authentication("failed to hash password".to_string()))
}

fn verify(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|_| Error::Authentication("invalid stored password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Create an administrator account and log them in
#[instrument(skip(state, password))]
pub fn register(state: &AppState, username: &str, password: &str) -> Result<Admin> {
    if username.len() < 3 {
        return Err(Error::InvalidOperation(
            "username must be at least 3 characters".to_string(),
        ));
    }
    if password.len() < 6 {
        return Err(Error::InvalidOperation(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;
    let admin = Admin::new(username.to_string(), password_hash);

    let db = state.db.lock().unwrap();
    if db.admins().find_by_username(username)?.is_some() {
        return Err(Error::InvalidOperation(
            "username already exists".to_string(),
        ));
    }
    db.admins().create(&admin)?;

    let session = Session::new(admin.id, state.settings.session_hours);
    db.admins().create_session(&session)?;
    drop(db);

    state.set_current_admin(Some(admin.id));
    state.set_current_session(Some(session.id));

    Ok(admin)
}

/// Log an administrator in
#[instrument(skip(state, password))]
pub fn login(state: &AppState, username: &str, password: &str) -> Result<Admin> {
    let db = state.db.lock().unwrap();

    let admin = db
        .admins()
        .find_by_username(username)?
        .ok_or_else(|| Error::Authentication("unknown username".to_string()))?;

    if !verify(password, &admin.password_hash)? {
        return Err(Error::Authentication("invalid password".to_string()));
    }

    db.admins().update_last_login(admin.id)?;
    db.admins().cleanup_expired_sessions()?;

    let session = Session::new(admin.id, state.settings.session_hours);
    db.admins().create_session(&session)?;
    drop(db);

    state.set_current_admin(Some(admin.id));
    state.set_current_session(Some(session.id));

    Ok(admin)
}

/// Log the current administrator out
#[instrument(skip(state))]
pub fn logout(state: &AppState) {
    if let Some(session_id) = state.current_session_id() {
        let db = state.db.lock().unwrap();
        let _ = db.admins().delete_session(session_id);
    }

    state.set_current_admin(None);
    state.set_current_session(None);
    state.set_current_room(None);
}

/// Re-check the logged-in administrator's password.
///
/// This is the confirmation gate for resolutions and finalization: the
/// caller already holds a session, but destructive writes demand the
/// password again.
#[instrument(skip(state, password))]
pub fn reauthenticate(state: &AppState, password: &str) -> Result<bool> {
    let admin_id = state.require_admin()?;

    let db = state.db.lock().unwrap();
    let admin = db
        .admins()
        .find_by_id(admin_id)?
        .ok_or_else(|| Error::Authentication("administrator not found".to_string()))?;

    verify(password, &admin.password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use caucus_core::Database;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        AppState::with_database(db, Settings::default())
    }

    #[test]
    fn test_register_and_login() {
        let state = test_state();
        let admin = register(&state, "chair", "hunter22").unwrap();
        assert_eq!(state.current_admin_id(), Some(admin.id));

        logout(&state);
        assert!(state.current_admin_id().is_none());

        let again = login(&state, "chair", "hunter22").unwrap();
        assert_eq!(again.id, admin.id);
        assert!(state.current_session_id().is_some());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let state = test_state();
        register(&state, "chair", "hunter22").unwrap();
        logout(&state);

        let result = login(&state, "chair", "wrong");
        assert!(matches!(result, Err(Error::Authentication(_))));
        assert!(state.current_admin_id().is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let state = test_state();
        register(&state, "chair", "hunter22").unwrap();
        assert!(register(&state, "chair", "other-pass").is_err());
    }

    #[test]
    fn test_short_credentials_rejected() {
        let state = test_state();
        assert!(register(&state, "ab", "hunter22").is_err());
        assert!(register(&state, "chair", "short").is_err());
    }

    #[test]
    fn test_reauthenticate() {
        let state = test_state();
        register(&state, "chair", "hunter22").unwrap();

        assert!(reauthenticate(&state, "hunter22").unwrap());
        assert!(!reauthenticate(&state, "nope").unwrap());

        logout(&state);
        assert!(reauthenticate(&state, "hunter22").is_err());
    }
}
