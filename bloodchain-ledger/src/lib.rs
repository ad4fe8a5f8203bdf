//! BloodChain Ledger
//!
//! Permissioned ledger for blood-unit transfers between hospitals.
//!
//! # Architecture
//!
//! - **Entity Store**: participants, credits, inventory, reputation
//! - **Validation Engine**: ordered business rules, settlement at mining time
//! - **Trust Scorer**: tampering penalties and permanent blacklisting
//! - **Chain**: canonical hashing, Merkle roots, proof-of-work, validation
//! - **Single Writer**: an actor serializes concurrent callers
//!
//! # Invariants
//!
//! - Append-only: blocks are never modified or reordered
//! - Every non-genesis block links to, and proves work against, its predecessor
//! - Inventory never goes negative
//! - Blacklisting is irreversible

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod canonical;
pub mod chain;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod error;
pub mod geo;
pub mod ledger;
pub mod merkle;
pub mod metrics;
pub mod pool;
pub mod pow;
pub mod store;
pub mod trust;
pub mod types;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use chain::{Block, Chain};
pub use config::Config;
pub use contract::RejectReason;
pub use error::{Error, Result};
pub use ledger::{Ledger, MiningReport, TransferFailure};
pub use pow::CancelToken;
pub use trust::PenaltyOutcome;
pub use types::{
    BloodType, Location, Participant, ParticipantId, ParticipantStats, SystemStats, Transaction,
    TransactionKind,
};
