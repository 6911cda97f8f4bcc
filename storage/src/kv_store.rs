//! A generic crash-safe key/value store: a [`Log`] of inserts and removals,
//! mirrored into an in-memory [`DashMap`] for fast, lock-striped lookups.
//!
//! Atomic check-and-insert comes from `DashMap::entry`. Because `DashMap`
//! compares keys by `Eq`/`Hash` (value equality), not by reference identity,
//! two identifiers built from the same bytes always collide in the map
//! regardless of which `HashOf<T>` instance produced them — there is no
//! reference-equality pitfall to guard against here.

use std::path::Path;

use dashmap::DashMap;
use parity_scale_codec::{Decode, Encode};

use crate::log::Log;

pub use crate::log::Error;

/// One logged mutation: either an insert of `key -> value`, or a tombstone
/// recording that `key` was removed.
#[derive(Encode, Decode)]
enum Record<K, V> {
    Put(K, V),
    Remove(K),
}

/// A key/value store whose contents survive a process restart.
///
/// `add` only inserts if the key is absent (mirroring the "ids never
/// change value once assigned" discipline used throughout for blocks,
/// transaction ids and seen-entity markers); callers that need upsert
/// semantics should not use this type.
pub(crate) struct KvStore<K, V> {
    log: Log,
    index: DashMap<K, V>,
}

impl<K, V> KvStore<K, V>
where
    K: Encode + Decode + Eq + std::hash::Hash + Clone,
    V: Encode + Decode + Clone,
{
    /// Open the store at `path`, replaying its log to rebuild the in-memory
    /// index.
    pub(crate) fn open(path: &Path) -> Result<Self, Error> {
        let log = Log::open(path)?;
        let index = DashMap::new();
        for frame in log.read_all()? {
            match Record::<K, V>::decode(&mut &frame[..]) {
                Ok(Record::Put(key, value)) => {
                    index.insert(key, value);
                }
                Ok(Record::Remove(key)) => {
                    index.remove(&key);
                }
                Err(error) => {
                    tracing::warn!(%error, "skipping malformed record while replaying store");
                }
            }
        }
        Ok(Self { log, index })
    }

    /// Whether `key` is currently present.
    pub(crate) fn has(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Look up `key`.
    pub(crate) fn by_id(&self, key: &K) -> Option<V> {
        self.index.get(key).map(|entry| entry.value().clone())
    }

    /// Insert `key -> value` if `key` is not already present. Returns
    /// `true` if this call performed the insert, `false` if `key` was
    /// already present (a no-op, matching the re-delivery-is-idempotent
    /// requirement for ids that never change value once assigned).
    pub(crate) fn add(&self, key: K, value: V) -> Result<bool, Error> {
        let mut inserted = false;
        self.index.entry(key.clone()).or_insert_with(|| {
            inserted = true;
            value.clone()
        });
        if inserted {
            self.log.append(&Record::Put(key, value).encode())?;
        }
        Ok(inserted)
    }

    /// Remove `key`, returning its former value if it was present.
    pub(crate) fn remove(&self, key: &K) -> Result<Option<V>, Error> {
        let removed = self.index.remove(key).map(|(_, value)| value);
        if removed.is_some() {
            self.log.append(&Record::<K, V>::Remove(key.clone()).encode())?;
        }
        Ok(removed)
    }

    /// Snapshot of every value currently stored, in no particular order.
    pub(crate) fn all(&self) -> Vec<V> {
        self.index.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of entries currently stored.
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Flush the underlying log file.
    pub(crate) fn close(&self) -> Result<(), Error> {
        self.log.close()
    }
}
