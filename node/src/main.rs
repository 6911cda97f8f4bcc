//! LightChain node entry point.

mod components;

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use lightchain_config::Configuration;
use lightchain_core::{ChainState, Component, IngestEngine, Orchestrator};
use lightchain_data_model::{Account, BlockHeader};
use lightchain_p2p::{Hub, Network, NodeId};
use lightchain_state::{Assigner, Snapshot};
use lightchain_storage::{Blocks, PendingTransactions, SeenEntities, TransactionIds};

use components::{BlockLoggerComponent, NetworkComponent};

/// Run a LightChain node: load configuration, open its stores, join the
/// message bus, and serve until interrupted.
#[derive(Debug, Parser)]
#[command(name = "lightchain-node", about = "A permissioned blockchain node")]
struct Args {
    /// Path to a JSON configuration file. Missing fields fall back to
    /// protocol defaults; a missing file falls back entirely to defaults.
    #[arg(long, default_value = "lightchain.json")]
    config: PathBuf,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Seconds allowed for every component to start before rollback.
    #[arg(long, default_value_t = 5)]
    start_deadline_secs: u64,
}

/// Genesis accounts seeded into `ChainState` as the snapshot referenced by
/// the genesis parent block id. Loaded from `<data_dir>/genesis.json` if
/// present; an absent file starts the node with no staked accounts, which
/// is only useful for exercising storage and the message bus in isolation.
fn load_genesis_accounts(data_dir: &std::path::Path) -> eyre::Result<HashMap<lightchain_data_model::AccountId, Account>> {
    let path = data_dir.join("genesis.json");
    if !path.exists() {
        tracing::warn!(path = %path.display(), "no genesis file found, starting with no staked accounts");
        return Ok(HashMap::new());
    }
    let contents = std::fs::read_to_string(&path)?;
    let accounts: Vec<Account> = serde_json::from_str(&contents)?;
    Ok(accounts.into_iter().map(|account| (account.id, account)).collect())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        Configuration::from_file(&args.config)?.with_env_overrides()
    } else {
        Configuration::default().with_env_overrides()
    };

    lightchain_logger::init(&args.log_level).ok();
    tracing::info!(node_id = %config.network.node_id, data_dir = %config.storage.data_dir.display(), "starting lightchain node");

    std::fs::create_dir_all(&config.storage.data_dir)?;
    let blocks = Blocks::open(&config.storage.data_dir.join("blocks"))?;
    let transaction_ids = TransactionIds::open(&config.storage.data_dir.join("transaction_ids.log"))?;
    let pending = PendingTransactions::open(&config.storage.data_dir.join("pending.log"))?;
    let seen = SeenEntities::open(&config.storage.data_dir.join("seen.log"))?;

    let chain_state = ChainState::new();
    let genesis_accounts = load_genesis_accounts(&config.storage.data_dir)?;
    chain_state.insert(
        BlockHeader::genesis_parent(),
        Snapshot::new(BlockHeader::genesis_parent(), 0, genesis_accounts),
    );

    let assigner = Assigner::new(config.ingest.min_stake);
    let engine = Arc::new(IngestEngine::new(
        blocks,
        transaction_ids,
        pending,
        seen,
        chain_state,
        assigner,
        config.ingest.validator_threshold,
        config.ingest.signature_threshold,
    ));

    let hub = Hub::new();
    let network: Arc<dyn Network> = Arc::new(hub.node(NodeId::new(config.network.node_id.clone())));

    let components: Vec<Arc<dyn Component>> = vec![
        Arc::new(NetworkComponent::new(engine.clone(), network)),
        Arc::new(BlockLoggerComponent::new(engine)),
    ];
    let orchestrator = Orchestrator::new(components);
    orchestrator.start(Duration::from_secs(args.start_deadline_secs)).await?;
    tracing::info!("lightchain node is up");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping");
    orchestrator.stop().await?;
    Ok(())
}
