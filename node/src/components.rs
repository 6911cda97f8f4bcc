//! [`lightchain_core::Component`] implementations the binary assembles into
//! an [`lightchain_core::Orchestrator`].

use std::sync::Arc;

use lightchain_core::{Component, IngestEngine};
use lightchain_p2p::{Conduit, Engine, Network, VALIDATED_BLOCKS, VALIDATED_TRANSACTIONS};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Registers the ingest engine on the validated-blocks and
/// validated-transactions channels, and drops the conduits (unregistering
/// nothing — a `Network` has no unregister op — but releasing the handles)
/// on stop.
pub struct NetworkComponent {
    engine: Arc<IngestEngine>,
    network: Arc<dyn Network>,
    conduits: Mutex<Vec<Conduit>>,
}

impl NetworkComponent {
    #[must_use]
    pub fn new(engine: Arc<IngestEngine>, network: Arc<dyn Network>) -> Self {
        Self {
            engine,
            network,
            conduits: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl Component for NetworkComponent {
    fn name(&self) -> &str {
        "network"
    }

    async fn start(&self) -> eyre::Result<()> {
        let engine: Arc<dyn Engine> = self.engine.clone();
        let blocks = self.network.register(engine.clone(), VALIDATED_BLOCKS)?;
        let transactions = self.network.register(engine, VALIDATED_TRANSACTIONS)?;
        *self.conduits.lock() = vec![blocks, transactions];
        Ok(())
    }

    async fn stop(&self) -> eyre::Result<()> {
        self.conduits.lock().clear();
        Ok(())
    }
}

/// Logs every block committed by the ingest engine, for operators watching
/// the process's output. Runs as a background task for the lifetime of the
/// component, stopped via a `Notify` rather than aborting the task outright
/// so an in-flight log line is allowed to finish.
pub struct BlockLoggerComponent {
    engine: Arc<IngestEngine>,
    task: Mutex<Option<(JoinHandle<()>, Arc<Notify>)>>,
}

impl BlockLoggerComponent {
    #[must_use]
    pub fn new(engine: Arc<IngestEngine>) -> Self {
        Self {
            engine,
            task: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl Component for BlockLoggerComponent {
    fn name(&self) -> &str {
        "block-logger"
    }

    async fn start(&self) -> eyre::Result<()> {
        let mut receiver = self.engine.subscribe_new_validated_block();
        let shutdown = Arc::new(Notify::new());
        let shutdown_signal = shutdown.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = shutdown_signal.notified() => break,
                    received = receiver.recv() => match received {
                        Ok(block_id) => tracing::info!(block_id = %block_id, "block committed"),
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "block logger fell behind committed blocks");
                        }
                    },
                }
            }
        });

        *self.task.lock() = Some((handle, shutdown));
        Ok(())
    }

    async fn stop(&self) -> eyre::Result<()> {
        let task = self.task.lock().take();
        if let Some((handle, shutdown)) = task {
            shutdown.notify_one();
            handle.await?;
        }
        Ok(())
    }
}
