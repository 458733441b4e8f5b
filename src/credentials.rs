//! API key persistence via OS keyring
//!
//! The generation API key lives in the operating system's native credential
//! store (Keychain on macOS, Secret Service on Linux, Windows Credential
//! Manager on Windows). `TEACHMATE_API_KEY` takes precedence when set, which
//! keeps CI and container use free of a keyring daemon.

use std::sync::RwLock;

use crate::error::Result;

/// Environment variable that overrides the stored key
pub const API_KEY_ENV: &str = "TEACHMATE_API_KEY";

/// Durable storage for the generation API key
pub trait CredentialStore: Send + Sync {
    /// Returns the configured key, or `None` when nothing is stored
    fn api_key(&self) -> Result<Option<String>>;

    /// Stores `key`, replacing any previous value
    fn set_api_key(&self, key: &str) -> Result<()>;

    /// Removes the stored key; succeeds when nothing was stored
    fn clear_api_key(&self) -> Result<()>;
}

/// Keyring-backed credential store
///
/// # Examples
///
/// ```no_run
/// use teachmate::credentials::{CredentialStore, KeyringCredentialStore};
///
/// # fn main() -> teachmate::error::Result<()> {
/// let store = KeyringCredentialStore::new();
/// store.set_api_key("AIza...")?;
/// assert!(store.api_key()?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct KeyringCredentialStore {
    service: String,
    user: String,
}

impl KeyringCredentialStore {
    /// Store under the default `teachmate` / `gemini_api_key` entry
    pub fn new() -> Self {
        Self::with_entry("teachmate", "gemini_api_key")
    }

    /// Store under a custom keyring entry
    pub fn with_entry(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, &self.user)?)
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn api_key(&self) -> Result<Option<String>> {
        if let Some(key) = key_from_env() {
            tracing::debug!("Using API key from {}", API_KEY_ENV);
            return Ok(Some(key));
        }

        let stored = keyring::Entry::new(&self.service, &self.user)
            .and_then(|entry| entry.get_password());
        stored_key(stored)
    }

    fn set_api_key(&self, key: &str) -> Result<()> {
        self.entry()?.set_password(key.trim())?;
        tracing::info!("Stored API key in keyring");
        Ok(())
    }

    fn clear_api_key(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                tracing::info!("Cleared API key from keyring");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process credential store
///
/// Holds the key for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryCredentialStore {
    key: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `key`
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: RwLock::new(Some(key.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn api_key(&self) -> Result<Option<String>> {
        Ok(self.key.read().ok().and_then(|k| k.clone()))
    }

    fn set_api_key(&self, key: &str) -> Result<()> {
        if let Ok(mut guard) = self.key.write() {
            *guard = Some(key.trim().to_string());
        }
        Ok(())
    }

    fn clear_api_key(&self) -> Result<()> {
        if let Ok(mut guard) = self.key.write() {
            *guard = None;
        }
        Ok(())
    }
}

/// Interprets a keyring lookup
///
/// An unreachable keyring (no secret service, locked storage) reads as "no
/// key", so callers report a missing credential instead of a platform error.
fn stored_key(lookup: std::result::Result<String, keyring::Error>) -> Result<Option<String>> {
    match lookup {
        Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
        Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
        Err(e @ (keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_))) => {
            tracing::warn!(error = %e, "Keyring unavailable, treating API key as not configured");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Masks a key for display, keeping the last four characters
///
/// # Examples
///
/// ```
/// use teachmate::credentials::mask_key;
///
/// assert_eq!(mask_key("AIzaSyABCDEF1234"), "************1234");
/// assert_eq!(mask_key("abc"), "***");
/// ```
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.api_key().unwrap(), None);

        store.set_api_key("  secret  ").unwrap();
        assert_eq!(store.api_key().unwrap(), Some("secret".to_string()));

        store.clear_api_key().unwrap();
        assert_eq!(store.api_key().unwrap(), None);
    }

    #[test]
    fn test_memory_store_with_key() {
        let store = MemoryCredentialStore::with_key("k");
        assert_eq!(store.api_key().unwrap().as_deref(), Some("k"));
    }

    #[test]
    #[serial]
    fn test_env_override_wins_over_keyring() {
        std::env::set_var(API_KEY_ENV, "from-env");
        let store = KeyringCredentialStore::with_entry("teachmate-test", "unused");
        let key = store.api_key().unwrap();
        std::env::remove_var(API_KEY_ENV);
        assert_eq!(key, Some("from-env".to_string()));
    }

    #[test]
    #[serial]
    fn test_blank_env_is_ignored() {
        std::env::set_var(API_KEY_ENV, "   ");
        let from_env = key_from_env();
        std::env::remove_var(API_KEY_ENV);
        assert_eq!(from_env, None);
    }

    #[test]
    fn test_stored_key_outcomes() {
        assert_eq!(
            stored_key(Ok("AIza".to_string())).unwrap().as_deref(),
            Some("AIza")
        );
        assert_eq!(stored_key(Ok("  ".to_string())).unwrap(), None);
        assert_eq!(stored_key(Err(keyring::Error::NoEntry)).unwrap(), None);
    }

    #[test]
    fn test_unreachable_keyring_reads_as_missing() {
        let no_service = keyring::Error::PlatformFailure("no secret service provider".into());
        assert_eq!(stored_key(Err(no_service)).unwrap(), None);

        let locked = keyring::Error::NoStorageAccess("collection is locked".into());
        assert_eq!(stored_key(Err(locked)).unwrap(), None);
    }

    #[test]
    fn test_other_keyring_errors_propagate() {
        let result = stored_key(Err(keyring::Error::TooLong("user".to_string(), 255)));
        assert!(result.is_err());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("12345678"), "****5678");
        assert_eq!(mask_key(""), "");
    }
}
