//! Deterministic selection of a validator committee for an entity.

use lightchain_crypto::Hash;
use lightchain_data_model::AccountId;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::Snapshot;

/// A deterministically chosen committee of exactly `k` account ids, drawn
/// from a snapshot's staked accounts.
///
/// Seeds an `StdRng` from a hash and shuffles a sorted candidate list to
/// get a deterministic-but-unpredictable order, then treats the shuffled
/// prefix as the committee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    members: Vec<AccountId>,
}

impl Assignment {
    /// Whether `id` is a member of this assignment.
    #[must_use]
    pub fn has(&self, id: AccountId) -> bool {
        self.members.contains(&id)
    }

    /// The assigned account ids, in no meaningful order beyond the shuffle
    /// that selected them.
    #[must_use]
    pub fn members(&self) -> &[AccountId] {
        &self.members
    }

    /// Number of assigned accounts. May be less than the requested `k` if
    /// the snapshot had fewer than `k` staked accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether this assignment selected nobody.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Deterministically assigns a validator committee to any entity, given a
/// snapshot of staked accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assigner {
    min_stake: u64,
}

impl Assigner {
    /// Build an assigner that draws committees from accounts staked at
    /// least `min_stake`.
    #[must_use]
    pub fn new(min_stake: u64) -> Self {
        Self { min_stake }
    }

    /// Select exactly `k` account ids deterministically from `snapshot`'s
    /// staked accounts, seeded by `entity_id`.
    ///
    /// Determinism: sort the staked account ids lexicographically (so the
    /// input to the shuffle does not depend on hash-map iteration order),
    /// seed an `StdRng` from `entity_id`'s bytes, and Fisher-Yates shuffle.
    /// The first `k` (or fewer, if the pool is smaller) form the
    /// assignment. Same `(entity_id, snapshot, k)` always yields the same
    /// assignment, on every node.
    #[must_use]
    pub fn assign(&self, entity_id: Hash, snapshot: &Snapshot, k: usize) -> Assignment {
        let mut pool = snapshot.staked_account_ids(self.min_stake);
        pool.sort();

        let seed: [u8; 32] = entity_id.into();
        let mut rng = StdRng::from_seed(seed);
        pool.shuffle(&mut rng);

        pool.truncate(k);
        Assignment { members: pool }
    }
}
