//! The tagged sum type that flows through the network: [`Entity`].

use lightchain_crypto::Hash;
use lightchain_merkle::MerkleEntity;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Block, BlockProposal, Transaction, ValidatedTransaction};

/// An entity kind the ingest engine does not understand. Such entities are
/// valid on the wire (other protocol messages use them) but [`process`]
/// rejects them with `InvalidArgument`.
///
/// [`process`]: https://docs.rs/lightchain_core (see `IngestEngine::process`)
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct OtherEntity {
    /// Wire-level tag naming the (unsupported) kind.
    pub kind_tag: String,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

/// Any message that can flow through the network. Every variant has an
/// identifier: `H(canonical_encode(self))` for the tagged variants it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum Entity {
    /// An unvalidated transaction as submitted by its sender.
    Transaction(Transaction),
    /// A transaction with enough validator certificates to be pending.
    ValidatedTransaction(ValidatedTransaction),
    /// A proposed block awaiting certification.
    BlockProposal(BlockProposal),
    /// A certified, committed block.
    Block(Block),
    /// An entity kind the ingest engine does not accept.
    Other(OtherEntity),
}

impl Entity {
    /// This entity's identifier, erased to an untyped [`Hash`].
    #[must_use]
    pub fn id(&self) -> Hash {
        match self {
            Self::Transaction(tx) => tx.id().untyped(),
            Self::ValidatedTransaction(tx) => tx.id().untyped(),
            Self::BlockProposal(proposal) => proposal.id().untyped(),
            Self::Block(block) => block.id().untyped(),
            Self::Other(other) => Hash::new(other.encode()),
        }
    }

    /// A short tag naming this entity's kind, used in logs and in the
    /// [`AuthenticatedEntity`](lightchain_merkle::AuthenticatedEntity) wrapper.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "Transaction",
            Self::ValidatedTransaction(_) => "ValidatedTransaction",
            Self::BlockProposal(_) => "BlockProposal",
            Self::Block(_) => "Block",
            Self::Other(_) => "Other",
        }
    }
}

impl MerkleEntity for Entity {
    fn merkle_id(&self) -> Hash {
        self.id()
    }

    fn kind(&self) -> &'static str {
        Entity::kind(self)
    }
}

impl From<Transaction> for Entity {
    fn from(tx: Transaction) -> Self {
        Self::Transaction(tx)
    }
}

impl From<ValidatedTransaction> for Entity {
    fn from(tx: ValidatedTransaction) -> Self {
        Self::ValidatedTransaction(tx)
    }
}

impl From<BlockProposal> for Entity {
    fn from(proposal: BlockProposal) -> Self {
        Self::BlockProposal(proposal)
    }
}

impl From<Block> for Entity {
    fn from(block: Block) -> Self {
        Self::Block(block)
    }
}
