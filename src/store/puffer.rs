use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::error::StoreError;
use super::file::BackingFile;
use super::memory::MemoryStore;
use super::snapshot::Snapshot;
use super::value::{FromValue, IntoValue, Kind, Value};
use super::writer::{Coordinator, PersistStats, Writer};
use crate::config::PufferConfig;
use crate::logging::{debug, info};

/// An in-memory typed key-value cache mirrored to a single JSON file.
///
/// Reads never touch the disk. Writes update memory and return immediately;
/// a dedicated writer thread then rewrites the backing file with a snapshot
/// of the whole store, coalescing bursts of mutations into one write.
///
/// # Durability
///
/// A successful `put`, `remove` or `remove_all` only means memory changed.
/// A write error in the background is not reported to that caller; it is
/// kept in [`last_error`](Self::last_error) and the next mutation retries.
/// [`flush`](Self::flush) blocks until everything mutated before the call is
/// on disk and returns the write error, if any. Dropping the store performs
/// a final flush unless `flush_on_drop` is disabled.
///
/// # Sharing
///
/// `Puffer` is `Send + Sync`; share it with `Arc<Puffer>`. Opening two stores
/// on the same file is not coordinated and the last writer wins.
///
/// # Example
///
/// ```no_run
/// use puffer_kv::Puffer;
///
/// # fn main() -> Result<(), puffer_kv::StoreError> {
/// let store = Puffer::open("settings.json")?;
/// store.put("volume", 7_i32)?;
/// assert_eq!(store.get::<i32>("volume")?, 7);
/// assert_eq!(store.get_or("missing", 3_i32)?, 3);
/// store.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct Puffer {
    memory: Arc<MemoryStore>,
    coordinator: Arc<Coordinator<BackingFile>>,
    file: BackingFile,
    _writer: Writer<BackingFile>,
}

impl Puffer {
    /// Open (or create) the store at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_config(PufferConfig::new(path.as_ref()))
    }

    pub fn with_config(config: PufferConfig) -> Result<Self, StoreError> {
        let persistence = config.persistence;
        let file = BackingFile::new(config.path, persistence.sync_data, persistence.pretty);

        let decoded = file.load()?;
        let skipped = decoded.skipped.len();
        let memory = Arc::new(MemoryStore::from_snapshot(decoded.snapshot));

        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&memory),
            file.clone(),
            persistence.flush_on_drop,
            skipped,
        ));
        let writer = Writer::spawn(Arc::clone(&coordinator), &persistence.thread_name)?;

        info!(
            path = %file.path().display(),
            entries = memory.len(),
            skipped,
            "store opened"
        );

        Ok(Self {
            memory,
            coordinator,
            file,
            _writer: writer,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the value under `key` as `T`.
    ///
    /// Fails with [`StoreError::KeyNotFound`] when the key is absent and
    /// [`StoreError::TypeMismatch`] when it holds another kind.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T, StoreError> {
        self.lookup(key)?
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    /// Like [`get`](Self::get), but returns `default` when the key is absent.
    /// A value of another kind is still a [`StoreError::TypeMismatch`].
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> Result<T, StoreError> {
        Ok(self.lookup(key)?.unwrap_or(default))
    }

    /// The stored value, whatever its kind.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.memory.read(key, Value::clone)
    }

    pub fn kind_of(&self, key: &str) -> Option<Kind> {
        self.memory.read(key, Value::kind)
    }

    /// Store `value` under `key`, replacing any previous value of any kind.
    ///
    /// Returns once memory is updated; persistence happens in the background.
    pub fn put<V: IntoValue>(&self, key: &str, value: V) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key must not be empty".to_string()));
        }
        let value = value.into_value()?;
        debug!(key = key, kind = %value.kind(), "put");

        self.memory.insert(key.to_string(), value);
        self.coordinator.request();
        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.memory.remove(key) {
            debug!(key = key, "remove");
        }
        self.coordinator.request();
        Ok(())
    }

    pub fn remove_all(&self) -> Result<(), StoreError> {
        self.memory.clear();
        debug!("remove_all");
        self.coordinator.request();
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.memory.contains(key)
    }

    pub fn keys(&self) -> BTreeSet<String> {
        self.memory.keys()
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        self.memory.snapshot()
    }

    /// Block until every mutation made before this call has been written.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.coordinator.flush()
    }

    /// Hold back background writes until the returned guard is dropped.
    ///
    /// Mutations made meanwhile are collected into a single write. Reads and
    /// [`flush`](Self::flush) are not affected.
    pub fn defer_persistence(&self) -> DeferGuard<'_> {
        self.coordinator.defer();
        DeferGuard { store: self }
    }

    pub fn stats(&self) -> PersistStats {
        self.coordinator.stats()
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.coordinator.last_error()
    }

    fn lookup<T: FromValue>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let found = self
            .memory
            .read(key, |value| T::from_value(value).ok_or_else(|| value.kind()));

        match found {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(stored)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                requested: T::KIND,
                stored,
            }),
        }
    }
}

impl fmt::Debug for Puffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puffer")
            .field("path", &self.file.path())
            .field("len", &self.memory.len())
            .finish_non_exhaustive()
    }
}

/// Returned by [`Puffer::defer_persistence`].
#[must_use = "persistence resumes as soon as the guard is dropped"]
pub struct DeferGuard<'a> {
    store: &'a Puffer,
}

impl Drop for DeferGuard<'_> {
    fn drop(&mut self) {
        self.store.coordinator.resume();
    }
}
