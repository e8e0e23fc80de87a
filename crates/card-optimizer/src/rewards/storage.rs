use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::domain::{Card, CardId};

/// Key under which the whole card collection is stored.
pub const CARDS_KEY: &str = "creditCards";

/// Flat string key-value store holding serialized collections.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store i/o failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored value for '{key}' is not valid card data: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key)(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(io_error(key))?;

        // Whole-value replace: write a per-writer sibling file then rename over the old one.
        let staging = self.root.join(format!("{key}.{}.tmp", Uuid::new_v4()));
        fs::write(&staging, value).map_err(io_error(key))?;
        fs::rename(&staging, &path).map_err(|err| {
            fs::remove_file(&staging).ok();
            io_error(key)(err)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key)(err)),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.guard()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.guard()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.guard()?.remove(key);
        Ok(())
    }
}

/// Card collection persisted as a single JSON array under [`CARDS_KEY`].
///
/// Mutations rewrite the whole collection while holding a write lock shared by all clones.
#[derive(Debug)]
pub struct CardRepository<S> {
    store: Arc<S>,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for CardRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> CardRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("card write lock poisoned".to_string()))
    }

    /// Full collection in insertion order; a missing key is an empty wallet.
    pub fn load(&self) -> Result<Vec<Card>, StoreError> {
        match self.store.get(CARDS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                    key: CARDS_KEY.to_string(),
                    source,
                })
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn save(&self, cards: &[Card]) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        self.write_all(cards)
    }

    fn write_all(&self, cards: &[Card]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(cards).map_err(|source| StoreError::Encode {
            key: CARDS_KEY.to_string(),
            source,
        })?;
        self.store.set(CARDS_KEY, &raw)
    }

    pub fn append(&self, card: Card) -> Result<Card, StoreError> {
        let _guard = self.lock_writes()?;
        let mut cards = self.load()?;
        cards.push(card.clone());
        self.write_all(&cards)?;
        Ok(card)
    }

    /// Remove a card by id, returning it when it was present.
    pub fn remove(&self, id: &CardId) -> Result<Option<Card>, StoreError> {
        let _guard = self.lock_writes()?;
        let cards = self.load()?;
        let (removed, kept): (Vec<Card>, Vec<Card>) =
            cards.into_iter().partition(|card| &card.id == id);
        if removed.is_empty() {
            return Ok(None);
        }
        self.write_all(&kept)?;
        Ok(removed.into_iter().next())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        self.store.remove(CARDS_KEY)
    }
}
