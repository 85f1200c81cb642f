//! Client-local key/value storage (the browser's `localStorage` equivalent).
//!
//! Everything kept here is advisory. Losing it rotates the actor identity and
//! empties the dedup ledgers, and the server still rejects duplicates.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Context};

pub const ACTOR_KEY: &str = "anon_id";
pub const VOTED_KEY: &str = "voted_posts";
pub const REPORTED_KEY: &str = "reported_posts";

pub trait LocalStore: Send + Sync {
    /// `Ok(None)` for a missing key, `Err` when storage cannot be used at all.
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Process-lifetime store. `unavailable()` models a context with no storage,
/// such as server-side rendering.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::default(),
            unavailable: true,
        }
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.unavailable {
            return Err(anyhow!("local storage is unavailable"));
        }
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.unavailable {
            return Err(anyhow!("local storage is unavailable"));
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, rewritten whole on every `set`.
pub struct FileStore {
    path: PathBuf,
    // serialises read-modify-write cycles from this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> anyhow::Result<HashMap<String, String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                log::warn!("ignoring corrupt local store {}: {}", self.path.display(), err);
                Ok(HashMap::new())
            }
        }
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec(&entries)?)
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
