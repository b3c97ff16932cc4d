//! Durable mirror of the signed-in user.
//!
//! Writes are fire-and-forget: a failed write is logged and otherwise ignored,
//! so a broken disk never blocks a sign-in.

use std::fs;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::user::User;

/// Key under which the current user is stored.
pub const SESSION_KEY: &str = "milaanUser";

pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Option<User>;
    fn save(&self, user: &User);
    fn clear(&self);
}

// ────────────────────────────────────────────────────────────────────────────
// FileSessionStorage
// ────────────────────────────────────────────────────────────────────────────

/// A JSON object on disk that behaves like browser local storage.
/// Only `SESSION_KEY` is touched; any other keys in the file are preserved.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(entries) => Ok(entries),
            _ => anyhow::bail!("{} is not a JSON object", self.path.display()),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>) -> Result<()>) -> Result<()> {
        // A corrupt file is replaced rather than preventing the write.
        let mut entries = self.read_entries().unwrap_or_default();
        apply(&mut entries)?;
        self.write_entries(&entries)
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Option<User> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable session file: {e:#}");
                return None;
            }
        };
        let value = entries.get(SESSION_KEY)?.clone();
        match serde_json::from_value::<User>(value) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring malformed stored user: {e}");
                None
            }
        }
    }

    fn save(&self, user: &User) {
        let result = self.update(|entries| {
            entries.insert(SESSION_KEY.to_string(), serde_json::to_value(user)?);
            Ok(())
        });
        match result {
            Ok(()) => debug!("Persisted session for user {}", user.id),
            Err(e) => warn!("Failed to persist session: {e:#}"),
        }
    }

    fn clear(&self) {
        if let Err(e) = self.update(|entries| {
            entries.remove(SESSION_KEY);
            Ok(())
        }) {
            warn!("Failed to clear session: {e:#}");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemorySessionStorage
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<User>>,
}

#[cfg(test)]
impl MemorySessionStorage {
    pub fn with_user(user: User) -> Self {
        Self {
            slot: Mutex::new(Some(user)),
        }
    }
}

#[cfg(test)]
impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Option<User> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn save(&self, user: &User) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(user.clone());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
