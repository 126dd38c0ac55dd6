//! Konfiguration
//!
//! Standardwerte mit Überschreibung per Umgebungsvariable:
//! - `GID_IDENTITY_PATH`: Pfad des Private Keys
//!   (Standard: App-Datenverzeichnis `keys/id.pem`)
//! - `GID_RAW_BASE_URL`: Raw-Content Host (Standard: `raw.githubusercontent.com`)
//! - `GID_REF`: Ref des veröffentlichten Keys (Standard: `gid/main`)
//! - `GID_KEY_PATH`: Pfad im Repository (Standard: `gid.pem`)

use std::path::PathBuf;

use thiserror::Error;

use crate::remote::{FetchError, RemoteKeyFetcher, DEFAULT_KEY_PATH, DEFAULT_RAW_BASE_URL, DEFAULT_REF};

pub const IDENTITY_PATH_ENV: &str = "GID_IDENTITY_PATH";
pub const RAW_BASE_URL_ENV: &str = "GID_RAW_BASE_URL";
pub const REF_ENV: &str = "GID_REF";
pub const KEY_PATH_ENV: &str = "GID_KEY_PATH";

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine app data directory, set GID_IDENTITY_PATH")]
    NoDataDirectory,
}

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Explizit gesetzter Identitätspfad, sonst App-Datenverzeichnis
    pub identity_path: Option<PathBuf>,
    pub raw_base_url: String,
    pub default_ref: String,
    pub key_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            identity_path: None,
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            default_ref: DEFAULT_REF.to_string(),
            key_path: DEFAULT_KEY_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Liest die Einstellungen aus der Umgebung
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            identity_path: var(IDENTITY_PATH_ENV).map(PathBuf::from),
            raw_base_url: var(RAW_BASE_URL_ENV).unwrap_or(defaults.raw_base_url),
            default_ref: var(REF_ENV).unwrap_or(defaults.default_ref),
            key_path: var(KEY_PATH_ENV).unwrap_or(defaults.key_path),
        }
    }

    /// Pfad des Private Keys
    pub fn identity_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.identity_path {
            Some(path) => Ok(path.clone()),
            None => default_identity_path(),
        }
    }

    /// Fetcher für den konfigurierten Raw-Content Host
    pub fn fetcher(&self) -> Result<RemoteKeyFetcher, FetchError> {
        RemoteKeyFetcher::with_base_url(&self.raw_base_url)
    }
}

/// Ermittelt den Standardpfad des Private Keys
///
/// - Linux: `~/.local/share/gid/keys/id.pem`
/// - macOS: `~/Library/Application Support/com.mynextid.gid/keys/id.pem`
/// - Windows: `%APPDATA%/mynextid/gid/data/keys/id.pem`
pub fn default_identity_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("com", "mynextid", "gid")
        .ok_or(ConfigError::NoDataDirectory)?;

    let mut path = proj_dirs.data_dir().to_path_buf();
    path.push("keys");
    path.push("id.pem");
    Ok(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.raw_base_url, "https://raw.githubusercontent.com");
        assert_eq!(settings.default_ref, "gid/main");
        assert_eq!(settings.key_path, "gid.pem");
    }

    #[test]
    fn test_env_overrides() {
        let settings = settings_from(&[
            (IDENTITY_PATH_ENV, "/tmp/keys/me.pem"),
            (RAW_BASE_URL_ENV, "https://git.example/raw"),
            (REF_ENV, "main"),
            (KEY_PATH_ENV, "keys/gid.pem"),
        ]);

        assert_eq!(settings.identity_path().unwrap(), PathBuf::from("/tmp/keys/me.pem"));
        assert_eq!(settings.raw_base_url, "https://git.example/raw");
        assert_eq!(settings.default_ref, "main");
        assert_eq!(settings.key_path, "keys/gid.pem");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let settings = settings_from(&[(REF_ENV, "  "), (IDENTITY_PATH_ENV, "")]);
        assert_eq!(settings.default_ref, DEFAULT_REF);
        assert_eq!(settings.identity_path, None);
    }

    #[test]
    fn test_default_identity_path_layout() {
        // Ohne HOME gibt es kein Datenverzeichnis
        if let Ok(path) = default_identity_path() {
            assert!(path.ends_with("keys/id.pem"));
        }
    }
}
