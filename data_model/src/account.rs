//! Accounts as they appear in a [`Snapshot`](crate::Snapshot).

use lightchain_crypto::{HashOf, PublicKey};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An account identifier, derived by hashing the account's public key.
pub type AccountId = HashOf<PublicKey>;

/// An account as of some [`Snapshot`](crate::Snapshot): balance, stake and
/// the last block this account participated in producing.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Account {
    /// This account's identifier.
    pub id: AccountId,
    /// The account's public key, used to verify certificates it produces.
    pub public_key: PublicKey,
    /// Balance, denominated in the chain's base unit.
    pub balance: u64,
    /// Stake, measured in the snapshot of interest.
    pub stake: u64,
    /// The last block this account's key was used in, if any.
    pub last_block_id: Option<HashOf<crate::BlockHeader>>,
}

impl Account {
    /// Whether this account is staked, i.e. `stake >= min_stake`.
    #[must_use]
    pub fn is_staked(&self, min_stake: u64) -> bool {
        self.stake >= min_stake
    }
}
