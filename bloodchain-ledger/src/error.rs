//! Error types for the ledger

use crate::contract::RejectReason;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown participant id
    #[error("Participant not found: {0}")]
    NotFound(String),

    /// Registration conflict
    #[error("Participant already registered: {0}")]
    DuplicateId(String),

    /// Transfer failed one of the ordered business rules
    #[error("Transfer rejected: {0}")]
    ValidationRejected(RejectReason),

    /// Unexpected state (negative inventory, broken chain linkage, etc.)
    #[error("Internal failure: {0}")]
    InternalFailure(String),

    /// Input refused at the boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Proof-of-work search was cancelled
    #[error("Mining cancelled")]
    Cancelled,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Rejection reason, if this error is a business-rule rejection
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Error::ValidationRejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<RejectReason> for Error {
    fn from(reason: RejectReason) -> Self {
        Error::ValidationRejected(reason)
    }
}
