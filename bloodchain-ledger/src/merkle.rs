//! Merkle commitments over a block's transactions
//!
//! # Design
//!
//! - Leaf = SHA-256 hex of a transaction's canonical bytes
//! - Parent = SHA-256 hex of the two child hex digests concatenated as text
//! - Odd levels duplicate their last hash before pairing
//! - Empty tree root = SHA-256 of the empty byte string
//! - A single leaf is its own root

use crate::{
    crypto::{empty_hash, sha256_hex},
    types::Transaction,
    Result,
};

/// Hash a pair of hex digests (used for internal nodes)
fn hash_pair(left: &str, right: &str) -> String {
    let mut combined = String::with_capacity(left.len() + right.len());
    combined.push_str(left);
    combined.push_str(right);
    sha256_hex(combined.as_bytes())
}

/// Leaf hash of a transaction
pub fn leaf_hash(tx: &Transaction) -> Result<String> {
    Ok(sha256_hex(&tx.canonical_bytes()?))
}

/// Merkle root of a transaction list
pub fn merkle_root(transactions: &[Transaction]) -> Result<String> {
    Ok(MerkleTree::from_transactions(transactions)?.root())
}

/// Merkle proof (path from leaf to root)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Leaf hash being proven
    pub leaf_hash: String,
    /// Sibling hashes along the path to root
    pub siblings: Vec<(Direction, String)>,
    /// Root hash
    pub root_hash: String,
}

/// Direction of sibling in Merkle tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sibling is on the left
    Left,
    /// Sibling is on the right
    Right,
}

impl MerkleProof {
    /// Verify proof against its root hash
    pub fn verify(&self) -> bool {
        let folded = self
            .siblings
            .iter()
            .fold(self.leaf_hash.clone(), |current, (direction, sibling)| match direction {
                Direction::Left => hash_pair(sibling, &current),
                Direction::Right => hash_pair(&current, sibling),
            });

        folded == self.root_hash
    }
}

/// Merkle tree with every level materialized
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// levels[0] = leaves, last = [root]; empty when there are no leaves
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Build tree from leaf hashes
    pub fn from_leaves(leaves: Vec<String>) -> Self {
        if leaves.is_empty() {
            return Self { levels: Vec::new() };
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [last] => hash_pair(last, last),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
            levels.push(next);
        }

        Self { levels }
    }

    /// Build tree over a transaction list
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self> {
        let leaves = transactions
            .iter()
            .map(leaf_hash)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_leaves(leaves))
    }

    /// Get number of leaves
    pub fn len(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merkle root
    pub fn root(&self) -> String {
        self.levels
            .last()
            .and_then(|top| top.first())
            .cloned()
            .unwrap_or_else(empty_hash)
    }

    /// Generate Merkle proof for a leaf at given index
    pub fn generate_proof(&self, leaf_index: usize) -> Option<MerkleProof> {
        let leaf_hash = self.levels.first()?.get(leaf_index)?.clone();
        let mut siblings = Vec::new();
        let mut index = leaf_index;

        // The top level is the root and has no sibling
        for level in &self.levels[..self.levels.len() - 1] {
            let entry = if index % 2 == 0 {
                // Odd level: the last node pairs with itself
                let sibling = level.get(index + 1).unwrap_or(&level[index]);
                (Direction::Right, sibling.clone())
            } else {
                (Direction::Left, level[index - 1].clone())
            };
            siblings.push(entry);
            index /= 2;
        }

        Some(MerkleProof {
            leaf_hash,
            siblings,
            root_hash: self.root(),
        })
    }

    /// Verify that a leaf exists in the tree
    pub fn verify_leaf(&self, leaf_index: usize, leaf_hash: &str) -> bool {
        match self.generate_proof(leaf_index) {
            Some(proof) => proof.leaf_hash == leaf_hash && proof.verify(),
            None => false,
        }
    }
}
