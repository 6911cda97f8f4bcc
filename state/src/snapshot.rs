//! [`Snapshot`]: an immutable per-block view of every account.

use std::collections::HashMap;

use lightchain_data_model::{Account, AccountId, BlockId};

/// A pure lookup structure over accounts as of a particular block. Once
/// constructed, a snapshot never changes; a new block produces a new
/// snapshot rather than mutating an existing one.
#[derive(Debug, Clone)]
pub struct Snapshot {
    reference_block_id: BlockId,
    reference_height: u64,
    accounts: HashMap<AccountId, Account>,
}

impl Snapshot {
    /// Build a snapshot as of `reference_block_id` at `reference_height`,
    /// over `accounts`.
    #[must_use]
    pub fn new(
        reference_block_id: BlockId,
        reference_height: u64,
        accounts: HashMap<AccountId, Account>,
    ) -> Self {
        Self {
            reference_block_id,
            reference_height,
            accounts,
        }
    }

    /// The block this snapshot is a view as-of.
    #[must_use]
    pub fn reference_block_id(&self) -> BlockId {
        self.reference_block_id
    }

    /// The height of [`Self::reference_block_id`].
    #[must_use]
    pub fn reference_height(&self) -> u64 {
        self.reference_height
    }

    /// Look up an account by id.
    #[must_use]
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Every account id with `stake >= min_stake`, the pool [`super::Assigner`]
    /// draws committees from.
    #[must_use]
    pub fn staked_account_ids(&self, min_stake: u64) -> Vec<AccountId> {
        self.accounts
            .values()
            .filter(|account| account.is_staked(min_stake))
            .map(|account| account.id)
            .collect()
    }

    /// Number of accounts known to this snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether this snapshot has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use lightchain_crypto::{Hash, KeyPair};
    use lightchain_data_model::BlockHeader;

    use super::*;

    fn account(stake: u64) -> Account {
        let keys = KeyPair::generate();
        Account {
            id: AccountId::new(keys.public_key()),
            public_key: keys.public_key().clone(),
            balance: 0,
            stake,
            last_block_id: None,
        }
    }

    #[test]
    fn staked_account_ids_filters_by_min_stake() {
        let staked = account(100);
        let unstaked = account(1);
        let mut accounts = HashMap::new();
        accounts.insert(staked.id, staked.clone());
        accounts.insert(unstaked.id, unstaked);

        let snapshot = Snapshot::new(BlockHeader::genesis_parent(), 0, accounts);
        let ids = snapshot.staked_account_ids(10);
        assert_eq!(ids, vec![staked.id]);
    }

    #[test]
    fn account_lookup_respects_membership() {
        let acc = account(50);
        let mut accounts = HashMap::new();
        accounts.insert(acc.id, acc.clone());
        let snapshot = Snapshot::new(BlockHeader::genesis_parent(), 1, accounts);
        assert_eq!(snapshot.account(acc.id), Some(&acc));
        assert_eq!(snapshot.account(AccountId::from_hash(Hash::zeroed())), None);
    }
}
