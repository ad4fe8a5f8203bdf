//! Metrics collection for observability
//!
//! Prometheus metrics for monitoring the ledger. Each [`Metrics`] owns its
//! registry, so several ledgers can live in one process.
//!
//! # Metrics
//!
//! - `bloodchain_blocks_mined_total` - Blocks appended to the chain
//! - `bloodchain_transactions_pooled_total` - Transactions queued in the pool
//! - `bloodchain_transfers_rejected_total` - Transfers refused by validation
//! - `bloodchain_penalties_total` - Tampering penalties applied
//! - `bloodchain_apply_failures_total` - Transfers that failed to settle at mining time
//! - `bloodchain_pending_transactions` - Current pool size
//! - `bloodchain_chain_length` - Current chain length (genesis included)
//! - `bloodchain_pow_duration_seconds` - Proof-of-work search latency

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Blocks mined
    pub blocks_mined: IntCounter,

    /// Transactions pooled
    pub transactions_pooled: IntCounter,

    /// Transfers rejected by validation
    pub transfers_rejected: IntCounter,

    /// Penalties applied
    pub penalties: IntCounter,

    /// Settlement failures during mining
    pub apply_failures: IntCounter,

    /// Pool size
    pub pending: IntGauge,

    /// Chain length
    pub chain_length: IntGauge,

    /// Proof-of-work duration histogram
    pub pow_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let blocks_mined = IntCounter::new(
            "bloodchain_blocks_mined_total",
            "Blocks appended to the chain",
        )?;
        registry.register(Box::new(blocks_mined.clone()))?;

        let transactions_pooled = IntCounter::new(
            "bloodchain_transactions_pooled_total",
            "Transactions queued in the pool",
        )?;
        registry.register(Box::new(transactions_pooled.clone()))?;

        let transfers_rejected = IntCounter::new(
            "bloodchain_transfers_rejected_total",
            "Transfers refused by validation",
        )?;
        registry.register(Box::new(transfers_rejected.clone()))?;

        let penalties = IntCounter::new(
            "bloodchain_penalties_total",
            "Tampering penalties applied",
        )?;
        registry.register(Box::new(penalties.clone()))?;

        let apply_failures = IntCounter::new(
            "bloodchain_apply_failures_total",
            "Transfers that failed to settle at mining time",
        )?;
        registry.register(Box::new(apply_failures.clone()))?;

        let pending = IntGauge::new(
            "bloodchain_pending_transactions",
            "Current pool size",
        )?;
        registry.register(Box::new(pending.clone()))?;

        let chain_length = IntGauge::new(
            "bloodchain_chain_length",
            "Current chain length",
        )?;
        registry.register(Box::new(chain_length.clone()))?;

        let pow_duration = Histogram::with_opts(
            HistogramOpts::new(
                "bloodchain_pow_duration_seconds",
                "Proof-of-work search latency",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
        )?;
        registry.register(Box::new(pow_duration.clone()))?;

        Ok(Self {
            blocks_mined,
            transactions_pooled,
            transfers_rejected,
            penalties,
            apply_failures,
            pending,
            chain_length,
            pow_duration,
            registry,
        })
    }

    /// Record a queued transaction
    pub fn record_pooled(&self, pending: usize) {
        self.transactions_pooled.inc();
        self.pending.set(pending as i64);
    }

    /// Record a validation rejection
    pub fn record_rejection(&self) {
        self.transfers_rejected.inc();
    }

    /// Record a penalty
    pub fn record_penalty(&self) {
        self.penalties.inc();
    }

    /// Record a mined block
    pub fn record_block_mined(&self, chain_length: usize, pending: usize, pow_seconds: f64) {
        self.blocks_mined.inc();
        self.chain_length.set(chain_length as i64);
        self.pending.set(pending as i64);
        self.pow_duration.observe(pow_seconds);
    }

    /// Record settlement failures from one block
    pub fn record_apply_failures(&self, count: usize) {
        self.apply_failures.inc_by(count as u64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("blocks_mined", &self.blocks_mined.get())
            .field("transactions_pooled", &self.transactions_pooled.get())
            .field("transfers_rejected", &self.transfers_rejected.get())
            .field("pending", &self.pending.get())
            .field("chain_length", &self.chain_length.get())
            .finish_non_exhaustive()
    }
}
