//! Durable storage of validated transactions awaiting inclusion in a block.

use std::path::Path;

use lightchain_data_model::{TransactionId, ValidatedTransaction};

use crate::kv_store::{Error, KvStore};

/// Validated transactions not yet drained into a committed block.
///
/// A "waiting to be proposed" set, mirroring the committed stores in using
/// a `DashMap`-backed log rather than an in-memory-only queue.
pub struct PendingTransactions {
    store: KvStore<TransactionId, ValidatedTransaction>,
}

impl PendingTransactions {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self {
            store: KvStore::open(path)?,
        })
    }

    /// Whether `id` is currently pending.
    #[must_use]
    pub fn has(&self, id: TransactionId) -> bool {
        self.store.has(&id)
    }

    /// Add `tx` to the pending set. A no-op if its id is already pending.
    pub fn add(&self, tx: ValidatedTransaction) -> Result<bool, Error> {
        let id = tx.id();
        self.store.add(id, tx)
    }

    /// Remove and return the pending transaction with this id, if any —
    /// used when a block is committed and drains its payload out of the
    /// pending set.
    pub fn remove(&self, id: TransactionId) -> Result<Option<ValidatedTransaction>, Error> {
        self.store.remove(&id)
    }

    /// Look up a pending transaction by id.
    #[must_use]
    pub fn by_id(&self, id: TransactionId) -> Option<ValidatedTransaction> {
        self.store.by_id(&id)
    }

    /// Snapshot of every currently pending transaction, in no particular
    /// order.
    #[must_use]
    pub fn all(&self) -> Vec<ValidatedTransaction> {
        self.store.all()
    }

    /// Number of pending transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether there are no pending transactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush the underlying log file.
    pub fn close(&self) -> Result<(), Error> {
        self.store.close()
    }
}
