//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (see [`crate::canonical`])
//! - Memory safety (no unsafe code)
//! - Exhaustive handling of transaction kinds

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Participant identifier (hospital id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create new participant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// ABO/Rh blood type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    /// O negative (universal donor)
    #[serde(rename = "O-")]
    ONeg,
    /// O positive
    #[serde(rename = "O+")]
    OPos,
    /// A negative
    #[serde(rename = "A-")]
    ANeg,
    /// A positive
    #[serde(rename = "A+")]
    APos,
    /// B negative
    #[serde(rename = "B-")]
    BNeg,
    /// B positive
    #[serde(rename = "B+")]
    BPos,
    /// AB negative
    #[serde(rename = "AB-")]
    AbNeg,
    /// AB positive (universal recipient)
    #[serde(rename = "AB+")]
    AbPos,
}

impl BloodType {
    /// Every blood type, in code order
    pub const ALL: [BloodType; 8] = [
        BloodType::ONeg,
        BloodType::OPos,
        BloodType::ANeg,
        BloodType::APos,
        BloodType::BNeg,
        BloodType::BPos,
        BloodType::AbNeg,
        BloodType::AbPos,
    ];

    /// Blood type code
    pub fn code(&self) -> &'static str {
        match self {
            BloodType::ONeg => "O-",
            BloodType::OPos => "O+",
            BloodType::ANeg => "A-",
            BloodType::APos => "A+",
            BloodType::BNeg => "B-",
            BloodType::BPos => "B+",
            BloodType::AbNeg => "AB-",
            BloodType::AbPos => "AB+",
        }
    }

    /// Recipients that can receive blood donated as `self`
    pub fn compatible_recipients(&self) -> &'static [BloodType] {
        use BloodType::*;
        match self {
            ONeg => &Self::ALL,
            OPos => &[OPos, APos, BPos, AbPos],
            ANeg => &[ANeg, APos, AbNeg, AbPos],
            APos => &[APos, AbPos],
            BNeg => &[BNeg, BPos, AbNeg, AbPos],
            BPos => &[BPos, AbPos],
            AbNeg => &[AbNeg, AbPos],
            AbPos => &[AbPos],
        }
    }

    /// Check donor/recipient compatibility
    pub fn can_donate_to(&self, recipient: BloodType) -> bool {
        self.compatible_recipients().contains(&recipient)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        BloodType::ALL
            .iter()
            .copied()
            .find(|bt| bt.code() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unknown blood type: {}", s)))
    }
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, -90..=90
    pub latitude: f64,
    /// Longitude, -180..=180
    pub longitude: f64,
}

impl Location {
    /// Create location (unchecked)
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Reject non-finite or out-of-range coordinates
    pub fn validate(&self) -> crate::Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(crate::Error::InvalidInput(format!(
                "Latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(crate::Error::InvalidInput(format!(
                "Longitude out of range: {}",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Great-circle distance to another location (km)
    pub fn distance_km(&self, other: &Location) -> f64 {
        crate::geo::haversine_km(self, other)
    }
}

/// Hospital participating in the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant ID
    pub id: ParticipantId,

    /// Display name
    pub name: String,

    /// Position used for transfer distance checks
    pub location: Location,

    /// Spendable balance gating outgoing transfers
    pub blood_credits: i64,

    /// Remaining strikes before blacklisting
    pub tampering_credits: i32,

    /// Units on hand per blood type
    pub inventory: BTreeMap<BloodType, u64>,

    /// Permanently excluded from transfers once set
    pub blacklisted: bool,

    /// Reputation score
    pub reputation: u8,

    /// Committed outgoing transfers
    pub transfers_sent: u64,

    /// Committed incoming transfers
    pub transfers_received: u64,
}

impl Participant {
    /// Units of `blood_type` on hand (missing entries count as zero)
    pub fn units(&self, blood_type: BloodType) -> u64 {
        self.inventory.get(&blood_type).copied().unwrap_or(0)
    }

    /// Total units across all blood types (saturating)
    pub fn total_units(&self) -> u64 {
        self.inventory
            .values()
            .fold(0u64, |total, units| total.saturating_add(*units))
    }
}

/// Transaction recorded on the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID (UUIDv7 for time-ordering)
    pub transaction_id: Uuid,

    /// Creation timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,

    /// Kind-specific payload
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Stamp a payload with a fresh id and the current time
    pub fn new(kind: TransactionKind) -> Self {
        Self {
            transaction_id: Uuid::now_v7(),
            timestamp_nanos: now_nanos(),
            kind,
        }
    }

    /// Canonical bytes (Merkle leaf preimage)
    pub fn canonical_bytes(&self) -> crate::Result<Vec<u8>> {
        crate::canonical::to_canonical_bytes(self)
    }

    /// Whether the transaction names `id` as a party
    pub fn involves(&self, id: &str) -> bool {
        match &self.kind {
            TransactionKind::Registration { participant_id, .. }
            | TransactionKind::InventoryUpdate { participant_id, .. }
            | TransactionKind::TamperingPenalty { participant_id, .. } => {
                participant_id.as_str() == id
            }
            TransactionKind::Transfer {
                sender_id,
                receiver_id,
                ..
            } => sender_id.as_str() == id || receiver_id.as_str() == id,
        }
    }

    /// Transfer payload, if this is a transfer
    pub fn as_transfer(&self) -> Option<TransferRef<'_>> {
        match &self.kind {
            TransactionKind::Transfer {
                sender_id,
                receiver_id,
                blood_type,
                quantity,
                ..
            } => Some(TransferRef {
                sender_id,
                receiver_id,
                blood_type: *blood_type,
                quantity: *quantity,
            }),
            _ => None,
        }
    }
}

/// Borrowed view of the fields needed to settle a transfer
#[derive(Debug, Clone, Copy)]
pub struct TransferRef<'a> {
    /// Sending participant
    pub sender_id: &'a ParticipantId,
    /// Receiving participant
    pub receiver_id: &'a ParticipantId,
    /// Blood type moved
    pub blood_type: BloodType,
    /// Units moved
    pub quantity: u64,
}

/// Transaction payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionKind {
    /// Participant joined the network
    #[serde(rename = "hospital_registration")]
    Registration {
        /// Registered participant
        participant_id: ParticipantId,
        /// Display name
        name: String,
        /// Latitude (degrees)
        latitude: f64,
        /// Longitude (degrees)
        longitude: f64,
        /// Starting blood credits
        initial_credits: i64,
    },

    /// Units added to a participant's inventory
    #[serde(rename = "inventory_update")]
    InventoryUpdate {
        /// Stocked participant
        participant_id: ParticipantId,
        /// Blood type stocked
        blood_type: BloodType,
        /// Units added
        quantity_added: u64,
        /// Units on hand after the update
        new_total: u64,
    },

    /// Validated transfer awaiting settlement at mining time
    #[serde(rename = "blood_transfer")]
    Transfer {
        /// Sending participant
        sender_id: ParticipantId,
        /// Receiving participant
        receiver_id: ParticipantId,
        /// Blood type moved
        blood_type: BloodType,
        /// Units moved
        quantity: u64,
        /// Free-form urgency label ("normal", "urgent", ...)
        urgency: String,
        /// Sender/receiver distance at proposal time
        distance_km: f64,
        /// SHA-256 hex binding the transfer parameters to its timestamp
        verification_hash: String,
        /// Status at proposal time
        status: TransferStatus,
    },

    /// Tampering penalty applied by the trust scorer
    #[serde(rename = "tampering_penalty")]
    TamperingPenalty {
        /// Penalized participant
        participant_id: ParticipantId,
        /// Why the penalty was applied
        reason: String,
        /// Strikes left after the penalty
        remaining_tampering_credits: i32,
        /// Reputation after the penalty
        new_reputation_score: u8,
        /// Blacklist flag after the penalty
        is_blacklisted: bool,
    },
}

/// Transfer status recorded in the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Validated, not yet settled
    Pending,
}

/// Per-participant statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStats {
    /// Participant snapshot
    #[serde(flatten)]
    pub participant: Participant,

    /// Committed transactions naming this participant
    pub total_transactions: usize,

    /// Blocks in the chain (genesis included)
    pub chain_length: usize,

    /// Transactions waiting in the pool
    pub pending_transactions: usize,
}

/// Network-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    /// Registered participants
    pub total_participants: usize,

    /// Participants not blacklisted
    pub active_participants: usize,

    /// Blacklisted participants
    pub blacklisted_participants: usize,

    /// Units on hand across all participants
    pub total_blood_units: u64,

    /// Units on hand per blood type
    pub blood_type_distribution: BTreeMap<BloodType, u64>,

    /// Blocks in the chain (genesis included)
    pub chain_length: usize,

    /// Transactions waiting in the pool
    pub pending_transactions: usize,

    /// Result of a full chain validation
    pub chain_valid: bool,
}

/// Current time in nanoseconds since Unix epoch
pub(crate) fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(0)
}
