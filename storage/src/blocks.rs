//! Durable storage of committed blocks, indexed both by id and by height.

use std::path::Path;

use lightchain_data_model::{Block, BlockId};

use crate::kv_store::{Error, KvStore};

/// Committed blocks, backed by two files: the blocks themselves, and a
/// height -> id secondary index, split the same way a data file and its
/// offset index usually are.
pub struct Blocks {
    primary: KvStore<BlockId, Block>,
    by_height: KvStore<u64, BlockId>,
}

impl Blocks {
    /// Open (or create) the blocks store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        Ok(Self {
            primary: KvStore::open(&dir.join("blocks.log"))?,
            by_height: KvStore::open(&dir.join("blocks_by_height.log"))?,
        })
    }

    /// Whether a block with this id is already stored.
    #[must_use]
    pub fn has(&self, id: BlockId) -> bool {
        self.primary.has(&id)
    }

    /// Store `block`, indexing it by both id and height. A no-op if a block
    /// with the same id is already present.
    pub fn add(&self, block: Block) -> Result<bool, Error> {
        let id = block.id();
        let height = block.height();
        let inserted = self.primary.add(id, block)?;
        if inserted {
            self.by_height.add(height, id)?;
        }
        Ok(inserted)
    }

    /// Look up a block by id.
    #[must_use]
    pub fn by_id(&self, id: BlockId) -> Option<Block> {
        self.primary.by_id(&id)
    }

    /// Look up the block committed at `height`, if any.
    #[must_use]
    pub fn at_height(&self, height: u64) -> Option<Block> {
        let id = self.by_height.by_id(&height)?;
        self.primary.by_id(&id)
    }

    /// Number of blocks stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored block, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<Block> {
        self.primary.all()
    }

    /// Flush both underlying log files.
    pub fn close(&self) -> Result<(), Error> {
        self.primary.close()?;
        self.by_height.close()
    }
}
