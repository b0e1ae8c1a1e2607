//! The in-memory map every read is served from.

use std::collections::BTreeSet;

use dashmap::DashMap;

use super::snapshot::Snapshot;
use super::value::Value;

/// Concurrent key -> value map.
///
/// Sharded, so operations on distinct keys rarely contend and never wait on
/// disk. A [`Snapshot`] copies one shard at a time; a mutation that races it
/// also bumps the writer generation, so the pass carrying that snapshot is
/// either abandoned or followed by a newer one.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            entries: snapshot.into_iter().collect(),
        }
    }

    /// Run `f` against the stored value without cloning it.
    pub(crate) fn read<R>(&self, key: &str, f: impl FnOnce(&Value) -> R) -> Option<R> {
        self.entries.get(key).map(|entry| f(entry.value()))
    }

    pub(crate) fn insert(&self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn keys(&self) -> BTreeSet<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
