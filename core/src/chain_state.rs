//! [`ChainState`]: a lookup table from block id to the account snapshot
//! referenced as-of that block.
//!
//! Populating this table (applying a committed block's transactions to
//! derive the next snapshot) is execution, which is out of scope here; this
//! type is a read path the ingest engine consults, written to externally
//! wherever the node assembles its accounts view.

use std::sync::Arc;

use dashmap::DashMap;
use lightchain_data_model::BlockId;
use lightchain_state::Snapshot;

/// A registry of snapshots, keyed by the block they are a view as-of.
#[derive(Default)]
pub struct ChainState {
    snapshots: DashMap<BlockId, Arc<Snapshot>>,
}

impl ChainState {
    /// An empty chain state with no snapshots registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot referenced as-of `block_id`, if known.
    #[must_use]
    pub fn at_block_id(&self, block_id: BlockId) -> Option<Arc<Snapshot>> {
        self.snapshots.get(&block_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Register (or replace) the snapshot referenced as-of `block_id`.
    pub fn insert(&self, block_id: BlockId, snapshot: Snapshot) {
        self.snapshots.insert(block_id, Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lightchain_data_model::BlockHeader;

    use super::*;

    #[test]
    fn unknown_block_id_has_no_snapshot() {
        let state = ChainState::new();
        assert!(state.at_block_id(BlockHeader::genesis_parent()).is_none());
    }

    #[test]
    fn inserted_snapshot_is_retrievable() {
        let state = ChainState::new();
        let snapshot = Snapshot::new(BlockHeader::genesis_parent(), 0, HashMap::new());
        state.insert(BlockHeader::genesis_parent(), snapshot);
        assert!(state.at_block_id(BlockHeader::genesis_parent()).is_some());
    }
}
