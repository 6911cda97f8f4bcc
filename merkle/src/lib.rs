//! An append-only, authenticated set of entities (C4 in the design): a
//! balanced binary Merkle tree over `H(entity.id)` leaves, producing
//! membership proofs verifiable in `O(log n)`.

mod tree;

use std::collections::HashMap;

use lightchain_crypto::Hash;
use parking_lot::RwLock;
use tree::{build, BuiltTree};

/// Which side of its level a proof's sibling hash occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The sibling is the left child at this level.
    Left,
    /// The sibling is the right child at this level.
    Right,
}

/// Anything that can be stored in a [`MerkleSet`]: a cloneable value with a
/// stable identifier and a wire-visible kind tag.
pub trait MerkleEntity: Clone {
    /// The identifier hashed to produce this entity's leaf.
    fn merkle_id(&self) -> Hash;

    /// A short tag naming the entity's kind, carried alongside the proof.
    fn kind(&self) -> &'static str;
}

/// An ordered path of sibling hashes sufficient to recompute a root from a
/// leaf, plus the root it was computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Hash of the leaf this proof authenticates.
    pub leaf_hash: Hash,
    /// Siblings from the leaf's level up to (not including) the root.
    pub siblings: Vec<(Hash, Direction)>,
    /// The root this proof was computed against. A `Proof` is a value, not a
    /// live reference: once captured it never updates, even if the tree
    /// that produced it later grows.
    pub root: Hash,
}

/// The result of [`MerkleSet::put`] or [`MerkleSet::get`]: an entity together
/// with a proof of its membership as of some observed root.
#[derive(Debug, Clone)]
pub struct AuthenticatedEntity<T> {
    /// Membership proof for `entity`.
    pub proof: Proof,
    /// The entity's kind tag, duplicated from [`MerkleEntity::kind`] for
    /// convenience at call sites that only have the authenticated wrapper.
    pub kind: &'static str,
    /// The authenticated entity itself.
    pub entity: T,
}

fn combine(left: &Hash, right: &Hash) -> Hash {
    let mut bytes = Vec::with_capacity(Hash::LENGTH * 2);
    bytes.extend_from_slice(left.as_ref());
    bytes.extend_from_slice(right.as_ref());
    Hash::new(bytes)
}

fn proof_path(built: &BuiltTree, mut idx: usize) -> Vec<(Hash, Direction)> {
    let mut siblings = Vec::new();
    while let Some(parent_idx) = built.arena[idx].parent {
        let parent = &built.arena[parent_idx];
        let (left, right) = (
            parent.left.expect("internal node has a left child"),
            parent.right.expect("internal node has a right child"),
        );
        if idx == left {
            siblings.push((built.arena[right].hash, Direction::Right));
        } else {
            siblings.push((built.arena[left].hash, Direction::Left));
        }
        idx = parent_idx;
    }
    siblings
}

/// Recompute a root by iteratively combining a leaf hash with its siblings.
fn recompute_root(leaf_hash: Hash, siblings: &[(Hash, Direction)]) -> Hash {
    siblings.iter().fold(leaf_hash, |current, (sibling, dir)| {
        match dir {
            Direction::Right => combine(&current, sibling),
            Direction::Left => combine(sibling, &current),
        }
    })
}

struct Inner<T> {
    entries: Vec<(Hash, T)>,
    index: HashMap<Hash, usize>,
    built: BuiltTree,
}

/// An append-only authenticated set of entities of kind `T`.
pub struct MerkleSet<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> Default for MerkleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MerkleSet<T> {
    /// An empty set, with no root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                index: HashMap::new(),
                built: build(&[]),
            }),
        }
    }

    /// The current root hash, or `None` if the set is empty.
    #[must_use]
    pub fn root(&self) -> Option<Hash> {
        let guard = self.inner.read();
        guard.built.root.map(|idx| guard.built.arena[idx].hash)
    }

    /// Number of distinct entities stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entity currently stored, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.read().entries.iter().map(|(_, entity)| entity.clone()).collect()
    }
}

impl<T: MerkleEntity> MerkleSet<T> {
    /// Insert `entity`, rebuilding the tree if it is new, and return an
    /// authenticated view of it against the resulting root.
    ///
    /// Idempotent: putting an entity whose id is already present returns the
    /// existing authenticated entity without adding a second leaf.
    pub fn put(&self, entity: T) -> AuthenticatedEntity<T> {
        let id = entity.merkle_id();
        let mut guard = self.inner.write();

        if !guard.index.contains_key(&id) {
            let leaf_hash = Hash::new(id.as_ref());
            let position = guard.entries.len();
            guard.entries.push((id, entity.clone()));
            guard.index.insert(id, position);

            let leaf_hashes: Vec<Hash> = guard.entries.iter().map(|(id, _)| Hash::new(id.as_ref())).collect();
            guard.built = build(&leaf_hashes);
            debug_assert_eq!(guard.built.arena[guard.built.leaf_indices[position]].hash, leaf_hash);
        }

        let position = guard.index[&id];
        let leaf_idx = guard.built.leaf_indices[position];
        let root = guard.built.root.expect("non-empty after insertion");
        let proof = Proof {
            leaf_hash: guard.built.arena[leaf_idx].hash,
            siblings: proof_path(&guard.built, leaf_idx),
            root: guard.built.arena[root].hash,
        };
        let kind = guard.entries[position].1.kind();
        AuthenticatedEntity {
            proof,
            kind,
            entity: guard.entries[position].1.clone(),
        }
    }

    /// Look up the current authenticated view of the entity identified by
    /// `id`, with a proof against the *current* root.
    #[must_use]
    pub fn get(&self, id: Hash) -> Option<AuthenticatedEntity<T>> {
        let guard = self.inner.read();
        let position = *guard.index.get(&id)?;
        let leaf_idx = guard.built.leaf_indices[position];
        let root = guard.built.root.expect("non-empty when an entry exists");
        let proof = Proof {
            leaf_hash: guard.built.arena[leaf_idx].hash,
            siblings: proof_path(&guard.built, leaf_idx),
            root: guard.built.arena[root].hash,
        };
        let (_, entity) = &guard.entries[position];
        Some(AuthenticatedEntity {
            proof,
            kind: entity.kind(),
            entity: entity.clone(),
        })
    }

    /// Verify that `authenticated` both recomputes correctly from its own
    /// captured root *and* that root is still the set's current root. A
    /// proof captured before a later `put` will fail the second check even
    /// though the first still holds.
    #[must_use]
    pub fn verify(&self, authenticated: &AuthenticatedEntity<T>) -> bool {
        let recomputed = recompute_root(authenticated.proof.leaf_hash, &authenticated.proof.siblings);
        if recomputed != authenticated.proof.root {
            return false;
        }
        self.root() == Some(authenticated.proof.root)
    }
}
