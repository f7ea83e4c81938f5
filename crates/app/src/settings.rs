//! Application settings
//!
//! Loaded from an optional `config.toml` in the platform config directory.
//! A missing file yields the defaults; a malformed file is an error rather
//! than a silent fallback.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Admin session lifetime in hours
    pub session_hours: i64,
    /// Length of generated share link tokens
    pub token_length: usize,
    /// Default share link expiry in hours
    pub link_expiry_hours: i64,
    /// Whether to record in-app notifications
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_hours: 24 * 7,
            token_length: 16,
            link_expiry_hours: 24 * 7,
            notifications_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load("/nonexistent/config.toml").unwrap();
        assert_eq!(settings.session_hours, 24 * 7);
        assert_eq!(settings.token_length, 16);
        assert!(settings.notifications_enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "token_length = 24\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.token_length, 24);
        assert_eq!(settings.session_hours, 24 * 7);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "token_length = \"many\"\n").unwrap();

        assert!(Settings::load(&path).is_err());
    }
}
