//! Well-known channel names.

/// Hello/demo traffic, not consumed by the ingest engine.
pub const BROADCAST_CHANNEL: &str = "broadcast-channel";
/// Block proposals awaiting certification.
pub const PROPOSED_BLOCKS: &str = "proposed-blocks";
/// Committed blocks. The ingest engine registers here.
pub const VALIDATED_BLOCKS: &str = "validated-blocks";
/// Validated transactions. The ingest engine registers here.
pub const VALIDATED_TRANSACTIONS: &str = "validated-transactions";
/// Certificate/vote traffic for proposals in flight.
pub const PROPOSALS_VOTING: &str = "proposals-voting";
