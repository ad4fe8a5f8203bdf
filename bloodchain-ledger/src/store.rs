//! Entity store: participant records
//!
//! The store owns every [`Participant`]. Registration and inventory changes
//! hand back the transaction record describing them; queuing that record is
//! the caller's job.

use crate::{
    config::TrustConfig,
    types::{BloodType, Location, Participant, ParticipantId, Transaction, TransactionKind},
    Error, Result,
};
use std::collections::HashMap;

/// Participant registry keyed by id
#[derive(Debug, Clone)]
pub struct EntityStore {
    participants: HashMap<ParticipantId, Participant>,
    initial_tampering_credits: i32,
    initial_reputation: u8,
}

impl EntityStore {
    /// Create an empty store
    pub fn new(trust: &TrustConfig) -> Self {
        Self {
            participants: HashMap::new(),
            initial_tampering_credits: trust.initial_tampering_credits,
            initial_reputation: trust.max_reputation,
        }
    }

    /// Register a participant
    pub fn register(
        &mut self,
        id: &str,
        name: &str,
        location: Location,
        initial_credits: i64,
    ) -> Result<Transaction> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("participant id must not be empty".to_string()));
        }
        if self.participants.contains_key(id) {
            return Err(Error::DuplicateId(id.to_string()));
        }
        location.validate()?;
        if initial_credits < 0 {
            return Err(Error::InvalidInput(format!(
                "initial credits must not be negative: {}",
                initial_credits
            )));
        }

        let participant_id = ParticipantId::new(id);
        let participant = Participant {
            id: participant_id.clone(),
            name: name.to_string(),
            location,
            blood_credits: initial_credits,
            tampering_credits: self.initial_tampering_credits,
            inventory: Default::default(),
            blacklisted: false,
            reputation: self.initial_reputation,
            transfers_sent: 0,
            transfers_received: 0,
        };
        self.participants.insert(participant_id.clone(), participant);

        Ok(Transaction::new(TransactionKind::Registration {
            participant_id,
            name: name.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
            initial_credits,
        }))
    }

    /// Add units to a participant's inventory
    pub fn add_inventory(
        &mut self,
        id: &str,
        blood_type: BloodType,
        quantity: u64,
    ) -> Result<Transaction> {
        let participant = self.get_mut(id)?;
        if quantity == 0 {
            return Err(Error::InvalidInput("quantity must be positive".to_string()));
        }

        let entry = participant.inventory.entry(blood_type).or_insert(0);
        *entry = entry
            .checked_add(quantity)
            .ok_or_else(|| Error::InvalidInput(format!("inventory overflow for {}", blood_type)))?;
        let new_total = *entry;

        Ok(Transaction::new(TransactionKind::InventoryUpdate {
            participant_id: participant.id.clone(),
            blood_type,
            quantity_added: quantity,
            new_total,
        }))
    }

    /// Participant by id
    pub fn get(&self, id: &str) -> Result<&Participant> {
        self.participants
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Mutable participant by id
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Participant> {
        self.participants
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.participants.contains_key(id)
    }

    /// Distance between two registered participants (km)
    pub fn distance_km(&self, a: &str, b: &str) -> Result<f64> {
        let a = self.get(a)?;
        let b = self.get(b)?;
        Ok(a.location.distance_km(&b.location))
    }

    /// Number of participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Check if no participant is registered
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Iterate over participants (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }
}
