//! [`IngestEngine`]: the concurrent core that accepts blocks and validated
//! transactions, deduplicates them, verifies validator certificates, and
//! commits them to durable storage.

use std::collections::HashSet;

use lightchain_crypto::{Hash, SignatureOf};
use lightchain_data_model::{AccountId, Block, BlockId, Entity, ValidatedTransaction};
use lightchain_state::{Assigner, Snapshot};
use lightchain_storage::{Blocks, PendingTransactions, SeenEntities, TransactionIds};
use parity_scale_codec::Encode;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{chain_state::ChainState, IngestError, Outcome};

const VALIDATED_BLOCK_CHANNEL_CAPACITY: usize = 256;

/// The concurrent ingest engine.
///
/// Accepts `Block` and `ValidatedTransaction` entities; any other kind is
/// rejected with [`IngestError::InvalidArgument`].
///
/// Concurrency: independent entities need no coordination beyond what the
/// underlying `DashMap`-backed stores already give for free. What does
/// need coordination is the cross-index commit for a *single* entity
/// (dedup-check, verify, then mutate three stores) racing against another
/// call's dedup-check for that same entity id. `commit_lock` serializes
/// the whole dedup-check-then-commit sequence across all entities,
/// trading some cross-entity parallelism for a lock-ordering-free
/// implementation.
pub struct IngestEngine {
    blocks: Blocks,
    transaction_ids: TransactionIds,
    pending: PendingTransactions,
    seen: SeenEntities,
    chain_state: ChainState,
    assigner: Assigner,
    validator_threshold: usize,
    signature_threshold: usize,
    commit_lock: Mutex<()>,
    validated_block_sender: broadcast::Sender<BlockId>,
}

impl IngestEngine {
    /// Build an ingest engine over the given stores, chain state, assigner
    /// and protocol thresholds (`VALIDATOR_THRESHOLD`, `SIGNATURE_THRESHOLD`).
    #[must_use]
    pub fn new(
        blocks: Blocks,
        transaction_ids: TransactionIds,
        pending: PendingTransactions,
        seen: SeenEntities,
        chain_state: ChainState,
        assigner: Assigner,
        validator_threshold: usize,
        signature_threshold: usize,
    ) -> Self {
        let (validated_block_sender, _) = broadcast::channel(VALIDATED_BLOCK_CHANNEL_CAPACITY);
        Self {
            blocks,
            transaction_ids,
            pending,
            seen,
            chain_state,
            assigner,
            validator_threshold,
            signature_threshold,
            commit_lock: Mutex::new(()),
            validated_block_sender,
        }
    }

    /// Access to this engine's chain state, for seeding genesis snapshots
    /// or wiring in an external state-computation component.
    #[must_use]
    pub fn chain_state(&self) -> &ChainState {
        &self.chain_state
    }

    /// Access to this engine's committed-blocks store, for read paths
    /// (e.g. a query service) that sit alongside ingestion.
    #[must_use]
    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Access to this engine's pending-transactions store.
    #[must_use]
    pub fn pending(&self) -> &PendingTransactions {
        &self.pending
    }

    /// Subscribe to newly committed blocks. The callback contract is a
    /// channel receive: each committed block id is sent exactly once,
    /// after its commit critical section and before the next commit on
    /// this engine.
    #[must_use]
    pub fn subscribe_new_validated_block(&self) -> broadcast::Receiver<BlockId> {
        self.validated_block_sender.subscribe()
    }

    /// Route `entity` to the block or transaction path, or reject it.
    pub fn ingest(&self, entity: Entity) -> Result<Outcome, IngestError> {
        match entity {
            Entity::Block(block) => self.ingest_block(block),
            Entity::ValidatedTransaction(tx) => self.ingest_validated_transaction(tx),
            other => Err(IngestError::InvalidArgument { kind: other.kind() }),
        }
    }

    fn ingest_block(&self, block: Block) -> Result<Outcome, IngestError> {
        let id = block.id();
        if self.seen.has(id.untyped()) {
            return Ok(Outcome::AlreadyProcessed);
        }

        let guard = self.commit_lock.lock();
        if self.seen.has(id.untyped()) {
            return Ok(Outcome::AlreadyProcessed);
        }

        let header = &block.proposal.header;
        if AccountId::new(block.proposal.proposer_signature.signer()) != header.proposer_id
            || block.proposal.proposer_signature.verify(header).is_err()
        {
            tracing::warn!(block_id = %id, "block proposer signature invalid, discarding");
            return Ok(Outcome::Rejected);
        }

        let snapshot = self
            .chain_state
            .at_block_id(block.proposal.header.previous_block_id)
            .ok_or(IngestError::UnknownParent {
                block_id: block.proposal.header.previous_block_id,
            })?;

        if !self.has_enough_valid_certificates(
            id.untyped(),
            &block.proposal.header,
            &block.certificates,
            &snapshot,
        ) {
            tracing::warn!(block_id = %id, "block failed certificate verification, discarding");
            return Ok(Outcome::Rejected);
        }

        self.seen.add(id.untyped())?;
        self.blocks.add(block.clone())?;
        for tx in block.payload() {
            self.transaction_ids.add(tx.id())?;
            if self.pending.has(tx.id()) {
                self.pending.remove(tx.id())?;
            }
        }
        drop(guard);

        // No active receivers is not an error: nobody is subscribed yet.
        let _ = self.validated_block_sender.send(id);
        Ok(Outcome::Committed)
    }

    fn ingest_validated_transaction(&self, tx: ValidatedTransaction) -> Result<Outcome, IngestError> {
        let id = tx.id();
        if self.seen.has(id.untyped()) {
            return Ok(Outcome::AlreadyProcessed);
        }

        let _guard = self.commit_lock.lock();
        if self.seen.has(id.untyped()) {
            return Ok(Outcome::AlreadyProcessed);
        }
        if self.transaction_ids.has(id) {
            self.seen.add(id.untyped())?;
            return Ok(Outcome::AlreadyProcessed);
        }

        let snapshot = self
            .chain_state
            .at_block_id(tx.ref_block_id())
            .ok_or(IngestError::UnknownParent {
                block_id: tx.ref_block_id(),
            })?;

        if !self.has_enough_valid_certificates(
            id.untyped(),
            &tx.transaction.payload,
            &tx.certificates,
            &snapshot,
        ) {
            tracing::warn!(tx_id = %id, "validated transaction failed certificate verification, discarding");
            return Ok(Outcome::Rejected);
        }

        self.seen.add(id.untyped())?;
        self.pending.add(tx)?;
        Ok(Outcome::Committed)
    }

    /// Count certificates that are (a) from a distinct assigned validator
    /// and (b) a valid signature by that validator over `payload`, and
    /// compare against `SIGNATURE_THRESHOLD`.
    fn has_enough_valid_certificates<T: Encode>(
        &self,
        entity_id: Hash,
        payload: &T,
        certificates: &[SignatureOf<T>],
        snapshot: &Snapshot,
    ) -> bool {
        let assignment = self.assigner.assign(entity_id, snapshot, self.validator_threshold);
        let mut distinct_signers = HashSet::new();
        let valid = certificates
            .iter()
            .filter(|certificate| {
                let signer = AccountId::new(certificate.signer());
                assignment.has(signer) && certificate.verify(payload).is_ok() && distinct_signers.insert(signer)
            })
            .count();
        valid >= self.signature_threshold
    }
}

impl lightchain_p2p::Engine for IngestEngine {
    fn process(&self, entity: Entity) {
        match self.ingest(entity) {
            Ok(_) | Err(IngestError::InvalidArgument { .. }) | Err(IngestError::UnknownParent { .. }) => {}
            Err(error @ IngestError::Store(_)) => {
                // A store write failed mid-commit: the in-memory index may
                // already be ahead of disk, or a block may be missing one
                // of its cross-index entries. Neither is safe to keep
                // serving from, and there is no partial-commit state here
                // worth trying to roll back in place, so the node goes
                // down rather than continue on broken invariants.
                tracing::error!(%error, "persistent store failure mid-commit, halting node");
                std::process::abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lightchain_crypto::KeyPair;
    use lightchain_data_model::{Account, BlockHeader, BlockProposal, Transaction, TransactionPayload};

    use super::*;

    fn engine(dir: &std::path::Path, validator_threshold: usize, signature_threshold: usize) -> IngestEngine {
        IngestEngine::new(
            Blocks::open(&dir.join("blocks")).unwrap(),
            TransactionIds::open(&dir.join("tx_ids.log")).unwrap(),
            PendingTransactions::open(&dir.join("pending.log")).unwrap(),
            SeenEntities::open(&dir.join("seen.log")).unwrap(),
            ChainState::new(),
            Assigner::new(10),
            validator_threshold,
            signature_threshold,
        )
    }

    struct Validators {
        keys: Vec<KeyPair>,
    }

    impl Validators {
        fn new(n: usize) -> Self {
            Self {
                keys: (0..n).map(|_| KeyPair::generate()).collect(),
            }
        }

        fn accounts(&self) -> HashMap<AccountId, Account> {
            self.keys
                .iter()
                .map(|keys| {
                    let id = AccountId::new(keys.public_key());
                    (
                        id,
                        Account {
                            id,
                            public_key: *keys.public_key(),
                            balance: 0,
                            stake: 100,
                            last_block_id: None,
                        },
                    )
                })
                .collect()
        }
    }

    fn seed_genesis(engine: &IngestEngine, validators: &Validators) {
        let snapshot = Snapshot::new(BlockHeader::genesis_parent(), 0, validators.accounts());
        engine.chain_state().insert(BlockHeader::genesis_parent(), snapshot);
    }

    fn sign_block(header: &BlockHeader, validators: &Validators, assigner: &Assigner, snapshot: &Snapshot, k: usize, sign_count: usize) -> Vec<SignatureOf<BlockHeader>> {
        let id = BlockId::new(header);
        let assignment = assigner.assign(id.untyped(), snapshot, k);
        validators
            .keys
            .iter()
            .filter(|keys| assignment.has(AccountId::new(keys.public_key())))
            .take(sign_count)
            .map(|keys| keys.sign(header))
            .collect()
    }

    fn block_with(validators: &Validators, assigner: &Assigner, snapshot: &Snapshot, k: usize, sign_count: usize) -> Block {
        let proposer = &validators.keys[0];
        let header = BlockHeader {
            height: 1,
            previous_block_id: BlockHeader::genesis_parent(),
            proposer_id: AccountId::new(proposer.public_key()),
            payload_merkle_root: lightchain_crypto::Hash::zeroed(),
        };
        let proposal = BlockProposal {
            proposer_signature: proposer.sign(&header),
            header: header.clone(),
            payload: Vec::new(),
        };
        Block {
            certificates: sign_block(&header, validators, assigner, snapshot, k, sign_count),
            proposal,
        }
    }

    #[test]
    fn valid_block_is_committed_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let validators = Validators::new(5);
        let eng = engine(dir.path(), 3, 2);
        seed_genesis(&eng, &validators);
        let snapshot = eng.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
        let assigner = Assigner::new(10);
        let block = block_with(&validators, &assigner, &snapshot, 3, 2);
        let id = block.id();

        assert_eq!(eng.ingest(Entity::Block(block.clone())).unwrap(), Outcome::Committed);
        assert!(eng.blocks().has(id));
        assert_eq!(eng.ingest(Entity::Block(block)).unwrap(), Outcome::AlreadyProcessed);
    }

    #[test]
    fn block_with_too_few_certificates_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let validators = Validators::new(5);
        let eng = engine(dir.path(), 3, 2);
        seed_genesis(&eng, &validators);
        let snapshot = eng.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
        let assigner = Assigner::new(10);
        let block = block_with(&validators, &assigner, &snapshot, 3, 1);
        let id = block.id();

        assert_eq!(eng.ingest(Entity::Block(block)).unwrap(), Outcome::Rejected);
        assert!(!eng.blocks().has(id));
    }

    #[test]
    fn block_with_unknown_parent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let validators = Validators::new(5);
        let eng = engine(dir.path(), 3, 2);
        // Genesis snapshot deliberately not seeded.
        let assigner = Assigner::new(10);
        let snapshot = Snapshot::new(BlockHeader::genesis_parent(), 0, validators.accounts());
        let block = block_with(&validators, &assigner, &snapshot, 3, 2);
        assert!(matches!(
            eng.ingest(Entity::Block(block)),
            Err(IngestError::UnknownParent { .. })
        ));
    }

    #[test]
    fn other_entity_kind_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let eng = engine(dir.path(), 3, 2);
        let entity = Entity::Other(lightchain_data_model::OtherEntity {
            kind_tag: "demo".to_owned(),
            payload: Vec::new(),
        });
        assert!(matches!(eng.ingest(entity), Err(IngestError::InvalidArgument { .. })));
    }

    #[test]
    fn committed_block_drains_matching_pending_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let validators = Validators::new(5);
        let eng = engine(dir.path(), 3, 2);
        seed_genesis(&eng, &validators);
        let snapshot = eng.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
        let assigner = Assigner::new(10);

        let sender = KeyPair::generate();
        let receiver = KeyPair::generate();
        let payload = TransactionPayload {
            ref_block_id: BlockHeader::genesis_parent(),
            sender: AccountId::new(sender.public_key()),
            receiver: AccountId::new(receiver.public_key()),
            amount: 1,
        };
        let signature = sender.sign(&payload);
        let transaction = Transaction { payload, signature };
        let tx_id = transaction.id();
        let validated = ValidatedTransaction {
            transaction,
            certificates: Vec::new(),
        };
        eng.pending().add(validated.clone()).unwrap();
        assert!(eng.pending().has(tx_id));

        let proposer = &validators.keys[0];
        let header = BlockHeader {
            height: 1,
            previous_block_id: BlockHeader::genesis_parent(),
            proposer_id: AccountId::new(proposer.public_key()),
            payload_merkle_root: lightchain_crypto::Hash::zeroed(),
        };
        let proposal = BlockProposal {
            proposer_signature: proposer.sign(&header),
            header: header.clone(),
            payload: vec![validated],
        };
        let block = Block {
            certificates: sign_block(&header, &validators, &assigner, &snapshot, 3, 3),
            proposal,
        };

        assert_eq!(eng.ingest(Entity::Block(block)).unwrap(), Outcome::Committed);
        assert!(!eng.pending().has(tx_id));
        assert!(eng.transaction_ids.has(tx_id));
    }

    #[test]
    fn subscriber_is_notified_exactly_once_per_committed_block() {
        let dir = tempfile::tempdir().unwrap();
        let validators = Validators::new(5);
        let eng = engine(dir.path(), 3, 2);
        seed_genesis(&eng, &validators);
        let snapshot = eng.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
        let assigner = Assigner::new(10);
        let block = block_with(&validators, &assigner, &snapshot, 3, 2);
        let id = block.id();

        let mut receiver = eng.subscribe_new_validated_block();
        eng.ingest(Entity::Block(block)).unwrap();
        assert_eq!(receiver.try_recv().unwrap(), id);
        assert!(receiver.try_recv().is_err());
    }
}
