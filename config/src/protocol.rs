//! Protocol constants.
//!
//! These are, per the contract every node must agree on, not runtime
//! config: [`IngestConfiguration`](crate::IngestConfiguration) exposes them
//! as overridable defaults purely so test fixtures can shrink a committee
//! down to a handful of validators; production deployments use the
//! defaults unchanged.

/// Number of validators assigned to certify each block or transaction (K).
pub const VALIDATOR_THRESHOLD: usize = 5;

/// Minimum number of valid, distinct certificates required to accept a
/// block or transaction. Must be `<= VALIDATOR_THRESHOLD`.
pub const SIGNATURE_THRESHOLD: usize = 4;

/// Minimum stake for an account to be eligible for validator assignment.
pub const MIN_STAKE: u64 = 1_000;

/// Width, in bits, of a block height counter.
pub const BLOCK_HEIGHT_BITS: u32 = 64;
