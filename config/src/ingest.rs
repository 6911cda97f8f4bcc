//! Ingest engine sub-configuration.

use serde::{Deserialize, Serialize};

use crate::protocol;

/// Thresholds the ingest engine enforces when verifying certificates.
///
/// These mirror the protocol constants in [`crate::protocol`]; they are
/// surfaced as configuration only so test fixtures can run with a smaller
/// committee. Production deployments should leave them at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfiguration {
    /// Number of validators assigned per entity (K).
    pub validator_threshold: usize,
    /// Minimum valid, distinct certificates required to accept an entity.
    pub signature_threshold: usize,
    /// Minimum stake for validator eligibility.
    pub min_stake: u64,
}

impl Default for IngestConfiguration {
    fn default() -> Self {
        Self {
            validator_threshold: protocol::VALIDATOR_THRESHOLD,
            signature_threshold: protocol::SIGNATURE_THRESHOLD,
            min_stake: protocol::MIN_STAKE,
        }
    }
}
