//! Transactions and the validator certificates that promote them to
//! [`ValidatedTransaction`]s.

use lightchain_crypto::HashOf;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{account::AccountId, BlockId};

/// The canonical, signature-excluded content of a [`Transaction`]. Hashing
/// this (not the whole transaction) gives the transaction its identifier,
/// per the "canonical fields ex. signature" rule.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Block this transaction was built against (for replay/staleness checks).
    pub ref_block_id: BlockId,
    /// Sending account.
    pub sender: AccountId,
    /// Receiving account.
    pub receiver: AccountId,
    /// Amount transferred.
    pub amount: u64,
}

/// A transaction's identifier: `H(canonical fields ex. signature)`.
pub type TransactionId = HashOf<TransactionPayload>;

/// A transaction as submitted by its sender: payload plus the sender's
/// signature over that payload.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Transaction {
    /// The signed content.
    pub payload: TransactionPayload,
    /// Sender's signature over `payload`.
    pub signature: lightchain_crypto::SignatureOf<TransactionPayload>,
}

impl Transaction {
    /// This transaction's identifier.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        TransactionId::new(&self.payload)
    }
}

/// A [`Transaction`] that has collected enough validator certificates to be
/// gossiped as pending and, eventually, included in a block.
///
/// A validated transaction's identifier is always its underlying
/// transaction's identifier: collecting certificates does not change what
/// transaction this is.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct ValidatedTransaction {
    /// The underlying transaction.
    pub transaction: Transaction,
    /// Certificates from the assigned validator committee, one signature per
    /// validator, each over `transaction.payload`.
    pub certificates: Vec<lightchain_crypto::SignatureOf<TransactionPayload>>,
}

impl ValidatedTransaction {
    /// This validated transaction's identifier: the id of its underlying
    /// [`Transaction`].
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.transaction.id()
    }

    /// The block this transaction was built against.
    #[must_use]
    pub fn ref_block_id(&self) -> BlockId {
        self.transaction.payload.ref_block_id
    }
}

#[cfg(test)]
mod tests {
    use lightchain_crypto::KeyPair;

    use super::*;
    use crate::BlockHeader;

    fn sample(amount: u64) -> Transaction {
        let sender = KeyPair::generate();
        let receiver = KeyPair::generate();
        let payload = TransactionPayload {
            ref_block_id: BlockHeader::genesis_parent(),
            sender: AccountId::new(sender.public_key()),
            receiver: AccountId::new(receiver.public_key()),
            amount,
        };
        let signature = sender.sign(&payload);
        Transaction { payload, signature }
    }

    #[test]
    fn id_ignores_signature() {
        let tx = sample(10);
        let re_signed = Transaction {
            payload: tx.payload.clone(),
            signature: KeyPair::generate().sign(&tx.payload),
        };
        assert_eq!(tx.id(), re_signed.id(), "signature must not affect identity");
    }

    #[test]
    fn different_amounts_differ() {
        assert_ne!(sample(10).id(), sample(11).id());
    }

    #[test]
    fn validated_transaction_id_delegates_to_inner() {
        let tx = sample(5);
        let id_before = tx.id();
        let validated = ValidatedTransaction {
            transaction: tx,
            certificates: Vec::new(),
        };
        assert_eq!(validated.id(), id_before);
    }
}
