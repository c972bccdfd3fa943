//! Merkle accumulators over BLAKE2b-256.
//!
//! Two accumulators share the same domain-separated node hashing:
//!
//! - [`MerkleAccumulator`] folds an ordered sequence of already-hashed
//!   leaves into a single root; the block commitment uses it to bind the
//!   transaction set.
//! - [`ElementAccumulator`] is the state's view of the element (UTXO)
//!   accumulator: one perfect subtree root per set bit of the leaf count.
//!   Its Merkle update logic lives in the block-application engine; here it
//!   is an opaque hashed field with its own codec.
//!
//! Leaves and interior nodes are hashed under distinct one-byte prefixes so
//! that a leaf can never be reinterpreted as a node.

use serde::ser::SerializeStruct;
use sia_types::{hash_bytes, Decodable, Decoder, Encodable, Encoder, Hash256};
use std::io::{Read, Write};

/// Domain prefix for leaf hashes.
pub(crate) const LEAF_HASH_PREFIX: u8 = 0x00;

/// Domain prefix for interior node hashes.
pub(crate) const NODE_HASH_PREFIX: u8 = 0x01;

pub(crate) fn node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut buf = [0; 65];
    buf[0] = NODE_HASH_PREFIX;
    buf[1..33].copy_from_slice(&left.0);
    buf[33..].copy_from_slice(&right.0);
    hash_bytes(&buf)
}

/// An append-only accumulator of hashed leaves.
///
/// Order-sensitive: the root commits to the exact sequence in which leaves
/// were added.
#[derive(Debug, Clone)]
pub(crate) struct MerkleAccumulator {
    trees: [Hash256; 64],
    num_leaves: u64,
}

impl MerkleAccumulator {
    pub fn new() -> Self {
        MerkleAccumulator {
            trees: [Hash256::default(); 64],
            num_leaves: 0,
        }
    }

    fn has_tree_at_height(&self, height: usize) -> bool {
        self.num_leaves & (1 << height) != 0
    }

    /// Appends an already-hashed leaf, merging perfect subtrees as their
    /// heights collide.
    pub fn add_leaf(&mut self, leaf: Hash256) {
        let mut h = leaf;
        let mut height = 0;
        while self.has_tree_at_height(height) {
            h = node_hash(&self.trees[height], &h);
            height += 1;
        }
        self.trees[height] = h;
        self.num_leaves += 1;
    }

    /// Returns the root of all leaves added so far; the zero hash if none.
    pub fn root(&self) -> Hash256 {
        if self.num_leaves == 0 {
            return Hash256::default();
        }
        let lowest = self.num_leaves.trailing_zeros() as usize;
        let mut root = self.trees[lowest];
        for height in lowest + 1..64 {
            if self.has_tree_at_height(height) {
                root = node_hash(&self.trees[height], &root);
            }
        }
        root
    }
}

/// The consensus view of the element accumulator: the roots of its perfect
/// subtrees and the total leaf count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementAccumulator {
    pub trees: [Hash256; 64],
    pub num_leaves: u64,
}

impl Default for ElementAccumulator {
    fn default() -> Self {
        ElementAccumulator {
            trees: [Hash256::default(); 64],
            num_leaves: 0,
        }
    }
}

impl ElementAccumulator {
    fn has_tree_at_height(&self, height: usize) -> bool {
        self.num_leaves & (1 << height) != 0
    }
}

impl Encodable for ElementAccumulator {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.num_leaves);
        // only the roots of populated subtrees are part of the encoding
        for height in 0..64 {
            if self.has_tree_at_height(height) {
                self.trees[height].encode_to(e);
            }
        }
    }
}

impl Decodable for ElementAccumulator {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let mut acc = ElementAccumulator {
            trees: [Hash256::default(); 64],
            num_leaves: d.read_u64(),
        };
        for height in 0..64 {
            if acc.has_tree_at_height(height) {
                acc.trees[height] = Hash256::decode_from(d);
            }
        }
        acc
    }
}

impl serde::Serialize for ElementAccumulator {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let roots: Vec<&Hash256> = (0..64)
            .filter(|&h| self.has_tree_at_height(h))
            .map(|h| &self.trees[h])
            .collect();
        let mut st = s.serialize_struct("ElementAccumulator", 2)?;
        st.serialize_field("numLeaves", &self.num_leaves)?;
        st.serialize_field("trees", &roots)?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sia_types::{from_bytes, to_bytes};

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(MerkleAccumulator::new().root(), Hash256::default());
    }

    #[test]
    fn test_single_leaf_root() {
        let mut acc = MerkleAccumulator::new();
        let leaf = hash_bytes(b"leaf");
        acc.add_leaf(leaf);
        assert_eq!(acc.root(), leaf);
    }

    #[test]
    fn test_two_leaves_use_node_prefix() {
        let (a, b) = (hash_bytes(b"a"), hash_bytes(b"b"));
        let mut acc = MerkleAccumulator::new();
        acc.add_leaf(a);
        acc.add_leaf(b);
        assert_eq!(acc.root(), node_hash(&a, &b));
    }

    #[test]
    fn test_order_sensitive() {
        let (a, b, c) = (hash_bytes(b"a"), hash_bytes(b"b"), hash_bytes(b"c"));
        let mut fwd = MerkleAccumulator::new();
        let mut rev = MerkleAccumulator::new();
        for leaf in [a, b, c] {
            fwd.add_leaf(leaf);
        }
        for leaf in [c, b, a] {
            rev.add_leaf(leaf);
        }
        assert_ne!(fwd.root(), rev.root());
    }

    #[test]
    fn test_odd_leaf_count() {
        // root(a, b, c) = node(node(a, b), c)
        let (a, b, c) = (hash_bytes(b"a"), hash_bytes(b"b"), hash_bytes(b"c"));
        let mut acc = MerkleAccumulator::new();
        for leaf in [a, b, c] {
            acc.add_leaf(leaf);
        }
        assert_eq!(acc.root(), node_hash(&node_hash(&a, &b), &c));
    }

    #[test]
    fn test_element_accumulator_codec() {
        let mut acc = ElementAccumulator::default();
        acc.num_leaves = 0b101; // subtrees at heights 0 and 2
        acc.trees[0] = hash_bytes(b"h0");
        acc.trees[2] = hash_bytes(b"h2");
        let buf = to_bytes(&acc);
        assert_eq!(buf.len(), 8 + 2 * 32);
        let back: ElementAccumulator = from_bytes(&buf).unwrap();
        assert_eq!(back, acc);
    }

    #[test]
    fn test_element_accumulator_skips_unset_roots() {
        let mut acc = ElementAccumulator::default();
        acc.num_leaves = 2;
        acc.trees[0] = hash_bytes(b"stale"); // height 0 unset, must not encode
        acc.trees[1] = hash_bytes(b"h1");
        let back: ElementAccumulator = from_bytes(&to_bytes(&acc)).unwrap();
        assert_eq!(back.trees[0], Hash256::default());
        assert_eq!(back.trees[1], acc.trees[1]);
    }
}
