//! The ingest engine's error taxonomy.

use lightchain_data_model::BlockId;

/// Failures [`crate::IngestEngine::ingest`] can surface to its caller.
///
/// Validation failures (bad or insufficient certificates) are not part of
/// this taxonomy: those are discarded silently and logged, per the
/// "validation failed" disposition, and show up as
/// [`crate::Outcome::Rejected`] rather than an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// An entity of a kind the engine does not accept arrived at `ingest`.
    /// Raised to the caller; never retried.
    #[error("entity kind {kind} is not accepted by the ingest engine")]
    InvalidArgument {
        /// The rejected entity's kind tag.
        kind: &'static str,
    },
    /// No snapshot is available for the referenced parent block. The full
    /// system would buffer this for later retry once the parent arrives;
    /// this engine treats it as fatal for the call and surfaces it.
    #[error("no snapshot available for parent block {block_id}")]
    UnknownParent {
        /// The parent block id that had no snapshot.
        block_id: BlockId,
    },
    /// A persistent store write failed mid-commit. Fatal: the caller
    /// (the orchestrator) must stop the node rather than leave the
    /// cross-index invariants broken.
    #[error("persistent store failure: {0}")]
    Store(#[from] lightchain_storage::Error),
}

/// The three dispositions a successfully routed `ingest` call can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The entity was new, valid, and committed to the relevant stores.
    Committed,
    /// The entity's id was already in `SeenEntities`; a silent no-op.
    AlreadyProcessed,
    /// The entity was new but failed certificate verification; discarded.
    Rejected,
}
