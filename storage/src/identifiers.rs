//! Durable sets of identifiers: committed transaction ids, and the broader
//! "have we seen this entity before" dedup set.

use std::path::Path;

use lightchain_crypto::Hash;
use lightchain_data_model::TransactionId;

use crate::kv_store::{Error, KvStore};

/// Identifiers of transactions that have been included in a committed
/// block. Once an id is a member, it is final: a transaction never leaves
/// this set.
pub struct TransactionIds {
    store: KvStore<TransactionId, ()>,
}

impl TransactionIds {
    /// Open (or create) the set at `path`.
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self {
            store: KvStore::open(path)?,
        })
    }

    /// Whether `id` has already been committed in some block.
    #[must_use]
    pub fn has(&self, id: TransactionId) -> bool {
        self.store.has(&id)
    }

    /// Record `id` as committed. A no-op if already present.
    pub fn add(&self, id: TransactionId) -> Result<bool, Error> {
        self.store.add(id, ())
    }

    /// Number of committed transaction ids recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Flush the underlying log file.
    pub fn close(&self) -> Result<(), Error> {
        self.store.close()
    }
}

/// The untyped dedup set of every entity identifier processed so far,
/// regardless of kind, used to make re-delivery of an already-seen entity a
/// cheap no-op before any validation work happens.
pub struct SeenEntities {
    store: KvStore<Hash, ()>,
}

impl SeenEntities {
    /// Open (or create) the set at `path`.
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self {
            store: KvStore::open(path)?,
        })
    }

    /// Whether `id` has already been seen.
    #[must_use]
    pub fn has(&self, id: Hash) -> bool {
        self.store.has(&id)
    }

    /// Record `id` as seen. A no-op if already present.
    pub fn add(&self, id: Hash) -> Result<bool, Error> {
        self.store.add(id, ())
    }

    /// Flush the underlying log file.
    pub fn close(&self) -> Result<(), Error> {
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use lightchain_crypto::KeyPair;
    use lightchain_data_model::{AccountId, BlockHeader, Transaction, TransactionPayload};

    use super::*;

    fn tx_id() -> TransactionId {
        let sender = KeyPair::generate();
        let receiver = KeyPair::generate();
        let payload = TransactionPayload {
            ref_block_id: BlockHeader::genesis_parent(),
            sender: AccountId::new(sender.public_key()),
            receiver: AccountId::new(receiver.public_key()),
            amount: 1,
        };
        let signature = sender.sign(&payload);
        Transaction { payload, signature }.id()
    }

    #[test]
    fn transaction_ids_add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ids = TransactionIds::open(&dir.path().join("tx_ids.log")).unwrap();
        let id = tx_id();
        assert!(ids.add(id).unwrap());
        assert!(!ids.add(id).unwrap());
        assert!(ids.has(id));
    }

    #[test]
    fn seen_entities_distinguishes_by_value_not_identity() {
        let dir = tempfile::tempdir().unwrap();
        let seen = SeenEntities::open(&dir.path().join("seen.log")).unwrap();
        let a = Hash::new(b"same-bytes");
        let b = Hash::new(b"same-bytes");
        seen.add(a).unwrap();
        // `b` is a distinct `Hash` value constructed independently of `a`,
        // but carries identical bytes, so it must already be considered seen.
        assert!(seen.has(b));
    }
}
