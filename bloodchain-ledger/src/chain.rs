//! Blocks and the append-only chain
//!
//! # Invariants
//!
//! For every block at index `i >= 1`:
//! - `hash` equals the canonical recomputation over the block's other fields
//! - `previous_hash` equals the hash of block `i - 1`
//! - `proof` satisfies the proof-of-work predicate against block `i - 1`
//! - `merkle_root` equals the root recomputed from `transactions`

use crate::{
    canonical::canonical_hash,
    merkle::{merkle_root, MerkleProof, MerkleTree},
    pow::valid_proof,
    types::{now_nanos, Transaction},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Previous-hash sentinel of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Validator recorded on the genesis block
pub const GENESIS_VALIDATOR: &str = "system";

/// Sealed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain (genesis = 0)
    pub index: u64,

    /// Sealing timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,

    /// Transactions in pool order
    pub transactions: Vec<Transaction>,

    /// Proof-of-work nonce relative to the previous block
    pub proof: u64,

    /// Hash of the previous block
    pub previous_hash: String,

    /// Merkle root of `transactions`
    pub merkle_root: String,

    /// Participant that mined the block
    pub validator: String,

    /// Hash of this block's contents
    pub hash: String,
}

/// Hashed view of a block: every field except `hash`
#[derive(Serialize)]
struct BlockContents<'a> {
    index: u64,
    timestamp_nanos: i64,
    transactions: &'a [Transaction],
    proof: u64,
    previous_hash: &'a str,
    merkle_root: &'a str,
    validator: &'a str,
}

impl Block {
    /// Create the genesis block
    pub fn genesis() -> Result<Self> {
        Self::seal(
            0,
            now_nanos(),
            Vec::new(),
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            GENESIS_VALIDATOR.to_string(),
        )
    }

    /// Build a block, computing its Merkle root and hash
    pub fn seal(
        index: u64,
        timestamp_nanos: i64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
        validator: String,
    ) -> Result<Self> {
        let mut block = Block {
            index,
            timestamp_nanos,
            merkle_root: merkle_root(&transactions)?,
            transactions,
            proof,
            previous_hash,
            validator,
            hash: String::new(), // Computed below
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    /// Compute block hash
    pub fn compute_hash(&self) -> Result<String> {
        canonical_hash(&BlockContents {
            index: self.index,
            timestamp_nanos: self.timestamp_nanos,
            transactions: &self.transactions,
            proof: self.proof,
            previous_hash: &self.previous_hash,
            merkle_root: &self.merkle_root,
            validator: &self.validator,
        })
    }

    /// Inclusion proof for the transaction at `tx_index`
    pub fn merkle_proof(&self, tx_index: usize) -> Result<Option<MerkleProof>> {
        Ok(MerkleTree::from_transactions(&self.transactions)?.generate_proof(tx_index))
    }
}

/// Which chain invariant a block breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Stored hash differs from the recomputed hash
    HashMismatch,
    /// `previous_hash` does not match the prior block
    BrokenLink,
    /// Proof fails the proof-of-work predicate
    InvalidProof,
    /// Stored Merkle root differs from the recomputed root
    MerkleRootMismatch,
    /// Block contents could not be encoded
    Unhashable,
}

/// First invariant violation found while validating a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainViolation {
    /// Offending block
    pub index: u64,
    /// Broken invariant
    pub kind: ViolationKind,
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}: {:?}", self.index, self.kind)
    }
}

/// Append-only sequence of blocks, never empty
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: u32,
}

impl Chain {
    /// Create a chain holding only a fresh genesis block
    pub fn new(difficulty: u32) -> Result<Self> {
        Ok(Self {
            blocks: vec![Block::genesis()?],
            difficulty,
        })
    }

    /// Proof-of-work difficulty used for validation
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Number of blocks (genesis included)
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block is created with the chain
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Latest block
    pub fn tail(&self) -> &Block {
        // Genesis is pushed in `new` and blocks are never removed
        &self.blocks[self.blocks.len() - 1]
    }

    /// Block by index
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// All blocks, genesis first
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterate over every committed transaction in chain order
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.blocks.iter().flat_map(|b| b.transactions.iter())
    }

    /// Append a sealed block that extends the tail
    pub fn push(&mut self, block: Block) -> Result<()> {
        let tail = self.tail();
        if block.index != tail.index + 1 {
            return Err(Error::InternalFailure(format!(
                "block index {} does not follow tail {}",
                block.index, tail.index
            )));
        }
        if block.previous_hash != tail.hash {
            return Err(Error::InternalFailure(format!(
                "block {} does not link to the chain tail",
                block.index
            )));
        }

        self.blocks.push(block);
        Ok(())
    }

    /// Validate the chain, reporting the earliest violation
    pub fn validate_detailed(&self) -> std::result::Result<(), ChainViolation> {
        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let violation = |kind| ChainViolation {
                index: current.index,
                kind,
            };

            match current.compute_hash() {
                Ok(hash) if hash == current.hash => {}
                Ok(_) => return Err(violation(ViolationKind::HashMismatch)),
                Err(_) => return Err(violation(ViolationKind::Unhashable)),
            }

            if current.previous_hash != previous.hash {
                return Err(violation(ViolationKind::BrokenLink));
            }

            if !valid_proof(previous.proof, current.proof, &previous.hash, self.difficulty) {
                return Err(violation(ViolationKind::InvalidProof));
            }

            match merkle_root(&current.transactions) {
                Ok(root) if root == current.merkle_root => {}
                Ok(_) => return Err(violation(ViolationKind::MerkleRootMismatch)),
                Err(_) => return Err(violation(ViolationKind::Unhashable)),
            }
        }

        Ok(())
    }

    /// Whether every block satisfies the chain invariants
    pub fn validate(&self) -> bool {
        match self.validate_detailed() {
            Ok(()) => true,
            Err(violation) => {
                tracing::warn!(%violation, "Chain validation failed");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::{proof_of_work, CancelToken};
    use crate::types::{BloodType, ParticipantId, TransactionKind};

    const DIFFICULTY: u32 = 2;

    fn inventory_tx(n: u64) -> Transaction {
        Transaction::new(TransactionKind::InventoryUpdate {
            participant_id: ParticipantId::new("HOSP001"),
            blood_type: BloodType::APos,
            quantity_added: n,
            new_total: n,
        })
    }

    fn extend(chain: &mut Chain, txs: Vec<Transaction>) {
        let tail = chain.tail().clone();
        let proof = proof_of_work(tail.proof, &tail.hash, DIFFICULTY, &CancelToken::new()).unwrap();
        let block = Block::seal(
            tail.index + 1,
            now_nanos(),
            txs,
            proof,
            tail.hash.clone(),
            "HOSP001".to_string(),
        )
        .unwrap();
        chain.push(block).unwrap();
    }

    fn chain_of(len: usize) -> Chain {
        let mut chain = Chain::new(DIFFICULTY).unwrap();
        for i in 1..len {
            extend(&mut chain, vec![inventory_tx(i as u64), inventory_tx(i as u64 + 100)]);
        }
        chain
    }

    #[test]
    fn test_genesis_block() {
        let chain = Chain::new(DIFFICULTY).unwrap();
        assert_eq!(chain.len(), 1);

        let genesis = chain.tail();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.validator, GENESIS_VALIDATOR);
        assert_eq!(genesis.proof, 0);
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.merkle_root, crate::crypto::empty_hash());
        assert_eq!(genesis.hash, genesis.compute_hash().unwrap());
        assert!(chain.validate());
    }

    #[test]
    fn test_valid_chain_validates() {
        let chain = chain_of(4);
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.validate_detailed(), Ok(()));
        assert_eq!(chain.transactions().count(), 6);
    }

    #[test]
    fn test_hash_changes_with_any_field() {
        let chain = chain_of(2);
        let block = chain.tail().clone();

        let mut other = block.clone();
        other.validator = "HOSP002".to_string();
        assert_ne!(other.compute_hash().unwrap(), block.hash);

        let mut other = block.clone();
        other.timestamp_nanos += 1;
        assert_ne!(other.compute_hash().unwrap(), block.hash);
    }

    #[test]
    fn test_flipped_hash_character_detected_on_every_block() {
        for target in 1..4u64 {
            let mut chain = chain_of(4);
            let block = &mut chain.blocks_mut()[target as usize];
            let flipped = if block.hash.starts_with('a') { "b" } else { "a" };
            block.hash.replace_range(0..1, flipped);

            assert!(!chain.validate());
            assert_eq!(
                chain.validate_detailed(),
                Err(ChainViolation {
                    index: target,
                    kind: ViolationKind::HashMismatch
                })
            );
        }
    }

    #[test]
    fn test_tampered_transaction_detected() {
        let mut chain = chain_of(3);
        if let TransactionKind::InventoryUpdate { new_total, .. } =
            &mut chain.blocks_mut()[1].transactions[0].kind
        {
            *new_total = 9_999;
        }

        assert_eq!(
            chain.validate_detailed(),
            Err(ChainViolation {
                index: 1,
                kind: ViolationKind::HashMismatch
            })
        );
    }

    #[test]
    fn test_rehashed_tampering_breaks_link() {
        let mut chain = chain_of(3);
        {
            let block = &mut chain.blocks_mut()[1];
            block.validator = "MALLORY".to_string();
            block.hash = block.compute_hash().unwrap();
        }

        assert_eq!(
            chain.validate_detailed(),
            Err(ChainViolation {
                index: 2,
                kind: ViolationKind::BrokenLink
            })
        );
    }

    #[test]
    fn test_invalid_proof_detected() {
        let mut chain = chain_of(2);
        {
            let previous = chain.blocks()[0].clone();
            let block = &mut chain.blocks_mut()[1];
            let mut bad = block.proof + 1;
            while valid_proof(previous.proof, bad, &previous.hash, DIFFICULTY) {
                bad += 1;
            }
            block.proof = bad;
            block.hash = block.compute_hash().unwrap();
        }

        assert_eq!(
            chain.validate_detailed(),
            Err(ChainViolation {
                index: 1,
                kind: ViolationKind::InvalidProof
            })
        );
    }

    #[test]
    fn test_merkle_root_mismatch_detected() {
        let mut chain = chain_of(2);
        {
            let block = &mut chain.blocks_mut()[1];
            block.merkle_root = crate::crypto::empty_hash();
            block.hash = block.compute_hash().unwrap();
        }

        assert_eq!(
            chain.validate_detailed(),
            Err(ChainViolation {
                index: 1,
                kind: ViolationKind::MerkleRootMismatch
            })
        );
    }

    #[test]
    fn test_push_rejects_unlinked_block() {
        let mut chain = chain_of(2);
        let tail = chain.tail().clone();
        let block = Block::seal(
            tail.index + 1,
            now_nanos(),
            vec![],
            0,
            "not-the-tail".to_string(),
            "HOSP001".to_string(),
        )
        .unwrap();

        assert!(matches!(chain.push(block), Err(Error::InternalFailure(_))));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_block_merkle_proof() {
        let chain = chain_of(2);
        let block = chain.tail();

        let proof = block.merkle_proof(1).unwrap().unwrap();
        assert_eq!(proof.root_hash, block.merkle_root);
        assert!(proof.verify());
        assert!(block.merkle_proof(2).unwrap().is_none());
    }
}
