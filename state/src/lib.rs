//! Immutable per-block account snapshots and deterministic validator
//! assignment.

mod assigner;
mod snapshot;

pub use assigner::{Assigner, Assignment};
pub use snapshot::Snapshot;
