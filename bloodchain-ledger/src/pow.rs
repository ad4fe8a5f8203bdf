//! Proof-of-work puzzle
//!
//! A nonce is valid for a predecessor `(proof, hash)` when
//! `sha256_hex(format!("{proof}{nonce}{hash}"))` starts with `difficulty`
//! `'0'` characters. The search walks nonces upward from zero and checks a
//! [`CancelToken`] between attempts so a long search can be abandoned.

use crate::{crypto::sha256_hex, Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A SHA-256 hex digest has 64 characters
pub const MAX_DIFFICULTY: u32 = 64;

/// Shared flag used to abort a running proof-of-work search
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new, unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Once set the token stays set.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Check a candidate nonce against the predecessor's proof and hash
pub fn valid_proof(last_proof: u64, proof: u64, last_hash: &str, difficulty: u32) -> bool {
    let guess = format!("{}{}{}", last_proof, proof, last_hash);
    let digest = sha256_hex(guess.as_bytes());
    digest
        .bytes()
        .take(difficulty as usize)
        .filter(|b| *b == b'0')
        .count()
        == difficulty as usize
}

/// Search for the first valid nonce
pub fn proof_of_work(
    last_proof: u64,
    last_hash: &str,
    difficulty: u32,
    cancel: &CancelToken,
) -> Result<u64> {
    if difficulty > MAX_DIFFICULTY {
        return Err(Error::InvalidInput(format!(
            "difficulty {} exceeds {}",
            difficulty, MAX_DIFFICULTY
        )));
    }

    let mut proof = 0u64;
    loop {
        if cancel.is_cancelled() {
            tracing::debug!(attempts = proof, "Proof-of-work search cancelled");
            return Err(Error::Cancelled);
        }
        if valid_proof(last_proof, proof, last_hash, difficulty) {
            tracing::debug!(proof, difficulty, "Proof-of-work found");
            return Ok(proof);
        }
        proof = proof
            .checked_add(1)
            .ok_or_else(|| Error::InternalFailure("nonce space exhausted".to_string()))?;
    }
}
