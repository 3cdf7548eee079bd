//! Durable key/value storage for the credential pair.
//!
//! Two string entries matter: `access` and `refresh`. A missing key means
//! "no credential". [`Credentials`] wraps any [`KeyValueStore`] with typed
//! accessors and hands tokens out as [`SecretString`] so they are not
//! printed by accident.

use crate::errors::ClientError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, warn};

pub const ACCESS_KEY: &str = "access";
pub const REFRESH_KEY: &str = "refresh";

/// File name used by [`FileStore::default_location`].
pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const ENV_CONFIG_DIR: &str = "CREWADMIN_CONFIG_DIR";

pub trait KeyValueStore: Send + Sync {
    /// # Errors
    /// Returns [`ClientError::Storage`] when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// # Errors
    /// Returns [`ClientError::Storage`] when the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// # Errors
    /// Returns [`ClientError::Storage`] when the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object on disk.
///
/// Every operation re-reads the file so that separate CLI invocations see
/// each other's writes. The lock only serializes access within one process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `$CREWADMIN_CONFIG_DIR/credentials.json`, falling back to
    /// `$HOME/.config/crewadmin/credentials.json`.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] when neither variable is set.
    pub fn default_location() -> Result<PathBuf, ClientError> {
        let dir = match std::env::var(ENV_CONFIG_DIR) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var("HOME").map_err(|_| {
                    ClientError::Config("HOME environment variable not set".to_string())
                })?;
                PathBuf::from(home).join(".config").join("crewadmin")
            }
        };
        Ok(dir.join(CREDENTIALS_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>, ClientError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|err| {
            ClientError::Storage(format!("failed to read {}: {err}", self.path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ClientError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(err) => Err(ClientError::Storage(format!(
                "failed to parse {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, map: &Map<String, Value>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ClientError::Storage(format!("failed to create {}: {err}", parent.display()))
            })?;
        }

        let content = serde_json::to_string_pretty(map)
            .map_err(|err| ClientError::Storage(format!("failed to encode store: {err}")))?;

        // The temp file is 0600 from creation and replaces the store in one rename.
        let temp_path = self.path.with_extension("json.tmp");
        let storage_error = |action: &str, err: std::io::Error| {
            ClientError::Storage(format!("failed to {action} {}: {err}", temp_path.display()))
        };

        if temp_path.exists() {
            fs::remove_file(&temp_path).map_err(|err| storage_error("remove stale", err))?;
        }
        let mut file = private_file(&temp_path).map_err(|err| storage_error("create", err))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|err| storage_error("write", err))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|err| {
            ClientError::Storage(format!(
                "failed to replace {}: {err}",
                self.path.display()
            ))
        })
    }
}

#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let map = self.read()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&map)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read()?;
        if map.remove(key).is_some() {
            self.write(&map)?;
        }
        Ok(())
    }
}

/// Access/refresh pair as issued by login or registration.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access: SecretString,
    pub refresh: SecretString,
}

/// Typed view over the `access` and `refresh` entries of a store.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Credentials over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Raw access entry. An empty string is returned as stored.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn access(&self) -> Result<Option<SecretString>, ClientError> {
        Ok(self.store.get(ACCESS_KEY)?.map(SecretString::from))
    }

    /// # Errors
    /// Propagates store failures.
    pub fn refresh(&self) -> Result<Option<SecretString>, ClientError> {
        Ok(self.store.get(REFRESH_KEY)?.map(SecretString::from))
    }

    /// Whether an access entry exists, regardless of its content or expiry.
    #[must_use]
    pub fn has_access(&self) -> bool {
        match self.store.get(ACCESS_KEY) {
            Ok(value) => value.is_some(),
            Err(err) => {
                warn!("Failed to read access token: {err}");
                false
            }
        }
    }

    /// # Errors
    /// Propagates store failures.
    pub fn set_access(&self, access: &SecretString) -> Result<(), ClientError> {
        self.store.set(ACCESS_KEY, access.expose_secret())
    }

    /// # Errors
    /// Propagates store failures.
    pub fn store_pair(&self, pair: &CredentialPair) -> Result<(), ClientError> {
        self.store.set(ACCESS_KEY, pair.access.expose_secret())?;
        self.store.set(REFRESH_KEY, pair.refresh.expose_secret())
    }

    /// Removes both entries. Both removals are attempted even if the first fails.
    ///
    /// # Errors
    /// Returns the first store failure.
    pub fn clear(&self) -> Result<(), ClientError> {
        let access = self.store.remove(ACCESS_KEY);
        let refresh = self.store.remove(REFRESH_KEY);
        debug!("Cleared stored credentials");
        access.and(refresh)
    }
}

/// Short, log-safe prefix of a token.
#[must_use]
pub fn redact(token: &SecretString) -> String {
    let prefix: String = token.expose_secret().chars().take(8).collect();
    format!("{prefix}...")
}
