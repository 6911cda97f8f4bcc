//! Block proposals and committed blocks.

use lightchain_crypto::{Hash, HashOf, SignatureOf};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{account::AccountId, ValidatedTransaction};

/// The canonical header of a block: everything needed to identify it and
/// commit to its payload, independent of the certificates that seal it.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height of this block. Height 1 is the first block after genesis.
    pub height: u64,
    /// Identifier of the immediately preceding block.
    pub previous_block_id: BlockId,
    /// The account that proposed this block.
    pub proposer_id: AccountId,
    /// Root of the Merkle tree over this block's payload transactions.
    pub payload_merkle_root: Hash,
}

/// A block's identifier: `H(header)`. Shared by a [`BlockProposal`] and the
/// [`Block`] built from it, since collecting certificates does not change
/// which block this is.
pub type BlockId = HashOf<BlockHeader>;

impl BlockHeader {
    /// The all-zeroes placeholder used as the "previous block" link of the
    /// genesis block.
    #[must_use]
    pub fn genesis_parent() -> BlockId {
        BlockId::from_hash(Hash::zeroed())
    }
}

/// A proposed block: a header, its ordered payload of validated
/// transactions, and the proposer's signature over the header.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct BlockProposal {
    /// The block's header.
    pub header: BlockHeader,
    /// Ordered payload of validated transactions.
    pub payload: Vec<ValidatedTransaction>,
    /// Proposer's signature over `header`.
    pub proposer_signature: SignatureOf<BlockHeader>,
}

impl BlockProposal {
    /// This proposal's identifier: `H(header)`.
    #[must_use]
    pub fn id(&self) -> BlockId {
        BlockId::new(&self.header)
    }
}

/// A committed block: a proposal plus the validator certificates that
/// sealed it.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Block {
    /// The sealed proposal.
    pub proposal: BlockProposal,
    /// Certificates from the assigned validator committee, one signature per
    /// validator, each over `proposal.header`.
    pub certificates: Vec<SignatureOf<BlockHeader>>,
}

impl Block {
    /// This block's identifier: its proposal's identifier.
    #[must_use]
    pub fn id(&self) -> BlockId {
        self.proposal.id()
    }

    /// This block's height.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.proposal.header.height
    }

    /// This block's payload of validated transactions.
    #[must_use]
    pub fn payload(&self) -> &[ValidatedTransaction] {
        &self.proposal.payload
    }
}

#[cfg(test)]
mod tests {
    use lightchain_crypto::KeyPair;

    use super::*;

    fn header(height: u64) -> BlockHeader {
        let proposer = KeyPair::generate();
        BlockHeader {
            height,
            previous_block_id: BlockHeader::genesis_parent(),
            proposer_id: AccountId::new(proposer.public_key()),
            payload_merkle_root: Hash::zeroed(),
        }
    }

    #[test]
    fn block_id_equals_proposal_id() {
        let keys = KeyPair::generate();
        let header = header(1);
        let proposal = BlockProposal {
            proposer_signature: keys.sign(&header),
            header,
            payload: Vec::new(),
        };
        let block = Block {
            certificates: vec![keys.sign(&proposal.header)],
            proposal: proposal.clone(),
        };
        assert_eq!(block.id(), proposal.id());
    }

    #[test]
    fn distinct_heights_give_distinct_ids() {
        assert_ne!(
            BlockId::new(&header(1)),
            BlockId::new(&header(2)),
            "height participates in the header hash"
        );
    }
}
