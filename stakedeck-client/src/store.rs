//! Durable key/value persistence for session data.
//!
//! The interface is deliberately infallible: callers treat the store the way
//! browser code treats local storage. The file-backed implementation logs
//! I/O failures instead of raising them, so a broken disk degrades to an
//! unauthenticated restart rather than a crashed client.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use directories::BaseDirs;
use shared::config::ClientConfig;
use tracing::warn;

/// Store key holding the serialized `{ user, tokens }` session value.
pub const USER_DATA_KEY: &str = "userData";

/// Durable key→string store consumed by the session controller.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Delete the value stored under `key`; absence is not an error.
    fn remove(&self, key: &str);
}

impl<T> SessionStore for std::sync::Arc<T>
where
    T: SessionStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// In-memory store; the default for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// File-backed store keeping one JSON file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store honoring the configured storage directory, falling
    /// back to the platform config directory.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.storage_dir {
            Some(dir) => Self::new(dir.clone()),
            None => Self::default(),
        }
    }

    /// Platform config directory for StakeDeck session files.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("stakedeck"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_file(path: &Path, value: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, value.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        if let Err(err) = Self::write_file(&path, value) {
            warn!(path = %path.display(), error = %err, "failed to persist session value");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %err, "failed to remove session value");
            }
        }
    }
}
