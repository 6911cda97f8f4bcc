//! Cross-module integration tests: two [`IngestEngine`]s wired together
//! through a [`lightchain_p2p::Hub`], exercising invariants that no single
//! crate's unit tests can see on their own.

use std::{collections::HashMap, sync::Arc};

use lightchain_core::{ChainState, IngestEngine, Outcome};
use lightchain_crypto::{Hash, KeyPair};
use lightchain_data_model::{Account, AccountId, Block, BlockHeader, BlockProposal, Entity};
use lightchain_p2p::{Engine, Hub, Network, NodeId, VALIDATED_BLOCKS, VALIDATED_TRANSACTIONS};
use lightchain_state::{Assigner, Snapshot};

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

fn engine(dir: &std::path::Path, validator_threshold: usize, signature_threshold: usize) -> IngestEngine {
    IngestEngine::new(
        lightchain_storage::Blocks::open(&dir.join("blocks")).unwrap(),
        lightchain_storage::TransactionIds::open(&dir.join("tx_ids.log")).unwrap(),
        lightchain_storage::PendingTransactions::open(&dir.join("pending.log")).unwrap(),
        lightchain_storage::SeenEntities::open(&dir.join("seen.log")).unwrap(),
        ChainState::new(),
        Assigner::new(10),
        validator_threshold,
        signature_threshold,
    )
}

fn signed_block(validators: &Validators, assigner: &Assigner, snapshot: &Snapshot, k: usize, sign_count: usize) -> Block {
    let proposer = &validators.keys[0];
    let header = BlockHeader {
        height: 1,
        previous_block_id: BlockHeader::genesis_parent(),
        proposer_id: AccountId::new(proposer.public_key()),
        payload_merkle_root: Hash::zeroed(),
    };
    let id = lightchain_data_model::BlockId::new(&header);
    let assignment = assigner.assign(id.untyped(), snapshot, k);
    let certificates = validators
        .keys
        .iter()
        .filter(|keys| assignment.has(AccountId::new(keys.public_key())))
        .take(sign_count)
        .map(|keys| keys.sign(&header))
        .collect();
    let proposal = BlockProposal {
        proposer_signature: proposer.sign(&header),
        header,
        payload: Vec::new(),
    };
    Block { certificates, proposal }
}

/// P6: an entity sent on channel c reaches only the engine registered on c
/// at the target node, never an engine registered on a different channel
/// at the same node.
#[test]
fn channel_isolation_delivers_only_to_the_matching_channel() {
    let block_dir = tempfile::tempdir().unwrap();
    let tx_dir = tempfile::tempdir().unwrap();
    let validators = Validators::new(5);

    let block_engine = Arc::new(engine(block_dir.path(), 3, 2));
    let tx_engine = Arc::new(engine(tx_dir.path(), 3, 2));
    block_engine.chain_state().insert(
        BlockHeader::genesis_parent(),
        Snapshot::new(BlockHeader::genesis_parent(), 0, validators.accounts()),
    );

    let hub = Hub::new();
    let node = hub.node(NodeId::new("peer-1"));
    let block_conduit = node
        .register(block_engine.clone() as Arc<dyn Engine>, VALIDATED_BLOCKS)
        .unwrap();
    node.register(tx_engine.clone() as Arc<dyn Engine>, VALIDATED_TRANSACTIONS)
        .unwrap();

    let assigner = Assigner::new(10);
    let snapshot = block_engine.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
    let block = signed_block(&validators, &assigner, &snapshot, 3, 2);
    let id = block.id();

    block_conduit.unicast(Entity::Block(block), &node.id()).unwrap();

    assert!(block_engine.blocks().has(id), "the block-channel engine must receive it");
    assert_eq!(tx_engine.pending().len(), 0, "the tx-channel engine must never see a block delivery");
}

/// P6, across two distinct nodes sharing the same hub: delivery to node B
/// never reaches node A's engine on the same channel.
#[test]
fn unicast_does_not_leak_to_other_nodes_on_the_same_channel() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let validators = Validators::new(5);

    let engine_a = Arc::new(engine(dir_a.path(), 3, 2));
    let engine_b = Arc::new(engine(dir_b.path(), 3, 2));
    for e in [&engine_a, &engine_b] {
        e.chain_state().insert(
            BlockHeader::genesis_parent(),
            Snapshot::new(BlockHeader::genesis_parent(), 0, validators.accounts()),
        );
    }

    let hub = Hub::new();
    let node_a = hub.node(NodeId::new("a"));
    let node_b = hub.node(NodeId::new("b"));
    let conduit_a = node_a.register(engine_a.clone() as Arc<dyn Engine>, VALIDATED_BLOCKS).unwrap();
    node_b.register(engine_b.clone() as Arc<dyn Engine>, VALIDATED_BLOCKS).unwrap();

    let assigner = Assigner::new(10);
    let snapshot = engine_a.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
    let block = signed_block(&validators, &assigner, &snapshot, 3, 2);
    let id = block.id();

    conduit_a.unicast(Entity::Block(block), &node_b.id()).unwrap();

    assert!(engine_b.blocks().has(id), "node b's engine must receive the delivery");
    assert!(!engine_a.blocks().has(id), "node a's own engine must not see a delivery addressed to node b");
}

/// P1/P2: concurrent delivery of the identical block commits it exactly
/// once, regardless of how many threads race to process it.
#[test]
fn concurrent_delivery_of_the_same_block_commits_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let validators = Validators::new(5);
    let engine = Arc::new(engine(dir.path(), 3, 2));
    engine.chain_state().insert(
        BlockHeader::genesis_parent(),
        Snapshot::new(BlockHeader::genesis_parent(), 0, validators.accounts()),
    );
    let assigner = Assigner::new(10);
    let snapshot = engine.chain_state().at_block_id(BlockHeader::genesis_parent()).unwrap();
    let block = signed_block(&validators, &assigner, &snapshot, 3, 2);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            let block = block.clone();
            std::thread::spawn(move || engine.ingest(Entity::Block(block)).unwrap())
        })
        .collect();
    let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(outcomes.iter().filter(|&&o| o == Outcome::Committed).count(), 1);
    assert_eq!(engine.blocks().len(), 1);
}
