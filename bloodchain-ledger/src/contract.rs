//! Transfer validation engine
//!
//! [`validate_transfer`] is a pure decision over participant snapshots.
//! [`apply_transfer`] settles a committed transfer against the entity store
//! and runs only at mining time.

use crate::{
    config::ContractConfig,
    store::EntityStore,
    types::{BloodType, Participant},
    Error, Result,
};
use std::fmt;

/// Business rule that rejected a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Sender is blacklisted
    SenderBlacklisted,
    /// Receiver is blacklisted
    ReceiverBlacklisted,
    /// Sender is below the minimum credit balance
    InsufficientCredits,
    /// Sender holds fewer units than requested
    InsufficientInventory,
    /// Participants are too far apart
    DistanceExceeded,
}

impl RejectReason {
    /// Rule name reported to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::SenderBlacklisted => "sender blacklisted",
            RejectReason::ReceiverBlacklisted => "receiver blacklisted",
            RejectReason::InsufficientCredits => "insufficient blood credits",
            RejectReason::InsufficientInventory => "insufficient inventory",
            RejectReason::DistanceExceeded => "distance exceeds maximum",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a proposed transfer. Rules short-circuit in declaration order.
pub fn validate_transfer(
    sender: &Participant,
    receiver: &Participant,
    blood_type: BloodType,
    quantity: u64,
    distance_km: f64,
    rules: &ContractConfig,
) -> std::result::Result<(), RejectReason> {
    if sender.blacklisted {
        return Err(RejectReason::SenderBlacklisted);
    }
    if receiver.blacklisted {
        return Err(RejectReason::ReceiverBlacklisted);
    }
    if sender.blood_credits < rules.min_blood_credits {
        return Err(RejectReason::InsufficientCredits);
    }
    if sender.units(blood_type) < quantity {
        return Err(RejectReason::InsufficientInventory);
    }
    if distance_km.is_nan() || distance_km > rules.max_distance_km {
        return Err(RejectReason::DistanceExceeded);
    }
    Ok(())
}

/// Settle a committed transfer.
///
/// Either every effect lands or none does: all preconditions are checked
/// before the first mutation.
pub fn apply_transfer(
    store: &mut EntityStore,
    sender_id: &str,
    receiver_id: &str,
    blood_type: BloodType,
    quantity: u64,
    rules: &ContractConfig,
) -> Result<()> {
    let sender = store
        .get(sender_id)
        .map_err(|_| Error::InternalFailure(format!("unknown sender {}", sender_id)))?;
    let available = sender.units(blood_type);
    if available < quantity {
        return Err(Error::InternalFailure(format!(
            "{} holds {} units of {}, transfer needs {}",
            sender_id, available, blood_type, quantity
        )));
    }

    let receiver = store
        .get(receiver_id)
        .map_err(|_| Error::InternalFailure(format!("unknown receiver {}", receiver_id)))?;
    let receiver_units = if sender_id == receiver_id {
        available - quantity
    } else {
        receiver.units(blood_type)
    };
    if receiver_units.checked_add(quantity).is_none() {
        return Err(Error::InternalFailure(format!(
            "inventory overflow for {} at {}",
            blood_type, receiver_id
        )));
    }

    let sender = store.get_mut(sender_id)?;
    sender.inventory.insert(blood_type, available - quantity);
    sender.blood_credits = sender.blood_credits.saturating_sub(rules.transfer_cost);
    sender.transfers_sent += 1;

    let receiver = store.get_mut(receiver_id)?;
    *receiver.inventory.entry(blood_type).or_insert(0) += quantity;
    receiver.blood_credits = receiver.blood_credits.saturating_add(rules.reception_reward);
    receiver.transfers_received += 1;

    Ok(())
}
