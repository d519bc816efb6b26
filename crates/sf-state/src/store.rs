//! Session persistence
//!
//! A key-value store with load/save semantics. `JsonFileStore` keeps one
//! pretty-printed JSON file per key; `MemoryStore` keeps the same JSON text
//! in memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::session::SessionState;

/// Default storage key
pub const DEFAULT_SESSION_KEY: &str = "raspadinha_game_state";

/// Durable session storage
pub trait SessionStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<SessionState>, StoreError>;

    fn save(&self, state: &SessionState) -> Result<(), StoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn load(&self) -> Result<Option<SessionState>, StoreError> {
        (**self).load()
    }

    fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<Option<SessionState>, StoreError> {
        (**self).load()
    }

    fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}

// ============ File Store ============

/// One JSON file per session key
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<key>.json`
    pub fn in_dir(dir: impl AsRef<Path>, key: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", sanitize_key(key))))
    }

    /// Default session file in the platform data directory
    pub fn default_location() -> Self {
        Self::in_dir(default_data_dir(), DEFAULT_SESSION_KEY)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<SessionState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let state = SessionState::from_json(&content)?;
        Ok(Some(state))
    }

    fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = state.to_json()?;

        // Write-then-rename; the file is never observed half-written
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("Session saved: {:?}", self.path);
        Ok(())
    }
}

/// Platform data directory for ScratchForge
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ScratchForge")
}

/// Keep keys to a safe file name
fn sanitize_key(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.is_empty() {
        DEFAULT_SESSION_KEY.to_string()
    } else {
        sanitized
    }
}

// ============ Memory Store ============

/// In-memory store holding the serialized JSON
///
/// Clones share the same slot, so a test can keep a handle after moving a
/// clone into a ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_state(state: &SessionState) -> Result<Self, StoreError> {
        let store = Self::new();
        store.save(state)?;
        Ok(store)
    }

    /// Raw stored JSON
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().clone()
    }

    /// Overwrite the raw JSON (used to simulate corrupt data)
    pub fn set_raw(&self, json: impl Into<String>) {
        *self.slot.lock() = Some(json.into());
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionState>, StoreError> {
        match self.slot.lock().as_deref() {
            Some(json) => Ok(Some(SessionState::from_json(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        let json = state.to_json()?;
        *self.slot.lock() = Some(json);
        Ok(())
    }
}
