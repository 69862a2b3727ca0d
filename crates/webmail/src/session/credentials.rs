//! Durable slot for the session credential
//!
//! At most one credential survives a restart. Its absence means "not logged
//! in locally", whatever the server-side cookie session says.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::models::Credential;

/// Key the credential is stored under
pub const CREDENTIAL_KEY: &str = "token";

/// Session slot filename in the Mailroom config directory
const SESSION_FILE: &str = "session.json";

/// Trait for the persisted credential slot
pub trait CredentialStore: Send + Sync {
    /// Read the persisted credential, if any
    fn load(&self) -> Result<Option<Credential>>;

    /// Replace the persisted credential
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the persisted credential. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<()>;
}

/// Credential slot backed by a JSON file
///
/// The file holds a single object keyed by [`CREDENTIAL_KEY`].
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Use the default slot (~/.config/mailroom/session.json)
    pub fn new() -> Result<Self> {
        let path = config::config_path(SESSION_FILE).context("Could not determine config directory")?;
        Ok(Self { path })
    }

    /// Use a slot at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let slot: HashMap<String, String> = config::load_json_file(&self.path)?;
        Ok(slot
            .get(CREDENTIAL_KEY)
            .filter(|token| !token.is_empty())
            .map(|token| Credential::new(token.as_str())))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let mut slot = HashMap::new();
        slot.insert(CREDENTIAL_KEY.to_string(), credential.as_str().to_string());
        config::save_json_file(&self.path, &slot)
    }

    fn clear(&self) -> Result<()> {
        config::remove_file(&self.path)
    }
}

/// Credential slot held in memory
#[derive(Default)]
pub struct InMemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds a credential
    pub fn with_credential(credential: impl Into<Credential>) -> Self {
        Self {
            slot: RwLock::new(Some(credential.into())),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot.read().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.write().unwrap() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.write().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = FileCredentialStore::at(tmp.path().join("session.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&Credential::new("tok1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credential::new("tok1")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_uses_fixed_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        let store = FileCredentialStore::at(&path);
        store.save(&Credential::new("tok2")).unwrap();

        let raw: HashMap<String, String> = config::load_json_file(&path).unwrap();
        assert_eq!(raw.get(CREDENTIAL_KEY).map(String::as_str), Some("tok2"));
    }

    #[test]
    fn test_file_store_corrupt_slot_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(FileCredentialStore::at(&path).load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = InMemoryCredentialStore::with_credential("abc");
        assert_eq!(store.load().unwrap(), Some(Credential::new("abc")));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
