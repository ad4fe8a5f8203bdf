//! Pending transactions awaiting a block, in arrival order.

use crate::types::Transaction;
use std::collections::VecDeque;

/// Unbounded FIFO transaction pool
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    pending: VecDeque<Transaction>,
}

impl TransactionPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transaction at the back
    pub fn push(&mut self, tx: Transaction) {
        self.pending.push_back(tx);
    }

    /// Copy of the first `max` transactions, leaving the pool untouched
    pub fn peek_batch(&self, max: usize) -> Vec<Transaction> {
        self.pending.iter().take(max).cloned().collect()
    }

    /// Remove the first `count` transactions
    pub fn drain_front(&mut self, count: usize) -> Vec<Transaction> {
        let count = count.min(self.pending.len());
        self.pending.drain(..count).collect()
    }

    /// Number of pending transactions
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterate in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.pending.iter()
    }
}
