//! Hashing primitives for the ledger
//!
//! All digests are SHA-256, rendered as lowercase hex because hex digests are
//! what blocks, Merkle nodes and the proof-of-work predicate operate on.

use sha2::{Digest, Sha256};

/// Hash arbitrary bytes using SHA-256
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(hash_bytes(data))
}

/// SHA-256 hex of the empty byte string (Merkle root of an empty block)
pub fn empty_hash() -> String {
    sha256_hex(b"")
}

/// Verification hash binding a transfer's parameters to its creation time
pub fn transfer_verification_hash(
    sender_id: &str,
    receiver_id: &str,
    blood_type: &str,
    quantity: u64,
    timestamp_nanos: i64,
) -> String {
    let data = format!(
        "{}{}{}{}{}",
        sender_id, receiver_id, blood_type, quantity, timestamp_nanos
    );
    sha256_hex(data.as_bytes())
}
