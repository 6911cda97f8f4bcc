//! Arena-backed binary Merkle tree construction.
//!
//! Nodes are addressed by index into a single [`Vec`] owned by the tree, per
//! the node-arena design note: no `Rc`/`RefCell` parent/child cycles, O(1)
//! sibling lookup through the `parent` index.

use lightchain_crypto::Hash;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub(crate) hash: Hash,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    pub(crate) parent: Option<usize>,
}

/// A fully materialized tree: the arena, the root index, and the arena index
/// of each leaf in insertion order.
pub(crate) struct BuiltTree {
    pub(crate) arena: Vec<Node>,
    pub(crate) root: Option<usize>,
    pub(crate) leaf_indices: Vec<usize>,
}

fn combine(left: &Hash, right: &Hash) -> Hash {
    let mut bytes = Vec::with_capacity(Hash::LENGTH * 2);
    bytes.extend_from_slice(left.as_ref());
    bytes.extend_from_slice(right.as_ref());
    Hash::new(bytes)
}

/// Build a balanced binary tree over `leaf_hashes`, in order.
///
/// When the number of leaves at any level is odd, the last node is paired
/// with itself (its own hash becomes its sibling) so every internal node has
/// exactly two children.
pub(crate) fn build(leaf_hashes: &[Hash]) -> BuiltTree {
    if leaf_hashes.is_empty() {
        return BuiltTree {
            arena: Vec::new(),
            root: None,
            leaf_indices: Vec::new(),
        };
    }

    let mut arena = Vec::with_capacity(leaf_hashes.len() * 2);
    let leaf_indices: Vec<usize> = leaf_hashes
        .iter()
        .map(|&hash| {
            let idx = arena.len();
            arena.push(Node {
                hash,
                left: None,
                right: None,
                parent: None,
            });
            idx
        })
        .collect();

    let mut level = leaf_indices.clone();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().expect("level is non-empty");
            level.push(last);
        }

        let mut next_level = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks(2) {
            let (left_idx, right_idx) = (pair[0], pair[1]);
            let parent_hash = combine(&arena[left_idx].hash, &arena[right_idx].hash);
            let parent_idx = arena.len();
            arena.push(Node {
                hash: parent_hash,
                left: Some(left_idx),
                right: Some(right_idx),
                parent: None,
            });
            arena[left_idx].parent = Some(parent_idx);
            arena[right_idx].parent = Some(parent_idx);
            next_level.push(parent_idx);
        }
        level = next_level;
    }

    BuiltTree {
        root: Some(level[0]),
        arena,
        leaf_indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_is_its_own_root() {
        let leaf = Hash::new(b"a");
        let tree = build(&[leaf]);
        let root = tree.root.expect("non-empty tree has a root");
        assert_eq!(tree.arena[root].hash, leaf);
    }

    #[test]
    fn odd_leaf_count_duplicates_last() {
        let leaves = [Hash::new(b"a"), Hash::new(b"b"), Hash::new(b"c")];
        let tree = build(&leaves);
        // Internal node for the lone third leaf combines it with itself.
        let third_leaf_idx = tree.leaf_indices[2];
        let parent_idx = tree.arena[third_leaf_idx].parent.unwrap();
        let parent = &tree.arena[parent_idx];
        assert_eq!(parent.left, parent.right);
    }
}
