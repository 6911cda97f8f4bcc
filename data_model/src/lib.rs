//! Wire data model shared by every LightChain component: accounts,
//! transactions, blocks, and the tagged [`Entity`] sum type that flows
//! through the network.

mod account;
mod block;
mod entity;
mod transaction;

pub use account::{Account, AccountId};
pub use block::{Block, BlockHeader, BlockId, BlockProposal};
pub use entity::{Entity, OtherEntity};
pub use transaction::{Transaction, TransactionId, TransactionPayload, ValidatedTransaction};
