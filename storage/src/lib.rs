//! Crash-safe persistent storage for committed blocks, committed
//! transaction ids, the entity dedup set, and pending validated
//! transactions.
//!
//! Every store here is an append-only log mirrored into an in-memory
//! `DashMap`-backed index: an 8-byte length prefix, the SCALE-encoded
//! payload, then a flush. A crash between the length prefix and the
//! payload leaves a recoverable, detectable torn write rather than
//! corrupting the rest of the log.

mod blocks;
mod identifiers;
mod kv_store;
mod log;
mod pending;

pub use blocks::Blocks;
pub use identifiers::{SeenEntities, TransactionIds};
pub use kv_store::Error;
pub use pending::PendingTransactions;
