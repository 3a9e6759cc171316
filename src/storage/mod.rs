//! Key-value persistence for game state and the display language.

pub mod background;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use derive_more::{Display, Error, From};

use crate::engine::models::GameState;
use crate::engine::session::StatePort;
use crate::i18n::Language;

pub const GAME_STATE_KEY: &str = "game-management-state";
pub const LANGUAGE_KEY: &str = "game-language";

#[derive(Debug, Display, Error, From)]
pub enum StoreError {
    #[display("storage I/O error: {_0}")]
    Io(std::io::Error),
    #[display("malformed record: {_0}")]
    Json(serde_json::Error),
    #[display("invalid key {_0:?}")]
    #[from(ignore)]
    InvalidKey(#[error(not(source))] String),
    #[display("store lock poisoned")]
    #[from(ignore)]
    Poisoned,
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Arc<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // readers never observe a partially written record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Game-level view over a key-value store.
#[derive(Debug, Clone)]
pub struct Persistence<K> {
    store: K,
}

impl<K: KeyValueStore> Persistence<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// `None` when nothing is stored or the record cannot be used.
    pub fn load_state(&self) -> Option<GameState> {
        let raw = match self.store.get(GAME_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored game state");
                return None;
            }
        };
        match serde_json::from_str::<GameState>(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse stored game state, starting fresh");
                None
            }
        }
    }

    pub fn save_state(&self, state: &GameState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.store.set(GAME_STATE_KEY, &json)
    }

    pub fn load_language(&self) -> Option<Language> {
        match self.store.get(LANGUAGE_KEY) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(lang) => Some(lang),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring stored language");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored language");
                None
            }
        }
    }

    pub fn save_language(&self, lang: Language) -> Result<(), StoreError> {
        self.store.set(LANGUAGE_KEY, lang.code())
    }
}

impl<K: KeyValueStore> StatePort for Persistence<K> {
    fn load(&self) -> Option<GameState> {
        self.load_state()
    }

    fn save(&self, state: &GameState) {
        if let Err(e) = self.save_state(state) {
            tracing::warn!(error = %e, "failed to save game state");
        }
    }
}
