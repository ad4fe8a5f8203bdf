//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern:
//! - One task owns the [`Ledger`]; every command is applied in mailbox order
//! - Callers talk to it through a cloneable [`LedgerHandle`]
//! - Bounded mailbox gives backpressure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        Callers (RPC front end, demo driver)          │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                   │
//! │         Sends commands to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │        LedgerActor (blocking thread pool)            │
//! │   register → validate → pool → mine → apply          │
//! │   replies over oneshot channels                      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Mining is CPU-bound, so the actor runs under `spawn_blocking`. A mine
//! carries a [`CancelToken`]; cancelling it from any task aborts the search
//! and leaves the ledger unchanged.

use crate::{
    chain::Block,
    ledger::MiningReport,
    merkle::MerkleProof,
    pow::CancelToken,
    trust::PenaltyOutcome,
    types::{BloodType, Participant, ParticipantStats, SystemStats, Transaction},
    Error, Ledger, Result,
};
use tokio::sync::{mpsc, oneshot};

/// Command sent to the ledger actor
#[derive(Debug)]
pub enum LedgerCommand {
    /// Register a participant
    RegisterParticipant {
        id: String,
        name: String,
        latitude: f64,
        longitude: f64,
        initial_credits: i64,
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Stock inventory
    AddInventory {
        id: String,
        blood_type: BloodType,
        quantity: u64,
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Validate and queue a transfer
    ProposeTransfer {
        sender_id: String,
        receiver_id: String,
        blood_type: BloodType,
        quantity: u64,
        urgency: String,
        response: oneshot::Sender<Result<Transaction>>,
    },

    /// Mine the next block
    Mine {
        miner_id: String,
        cancel: CancelToken,
        response: oneshot::Sender<Result<Option<MiningReport>>>,
    },

    /// Check chain integrity
    ValidateChain { response: oneshot::Sender<bool> },

    /// Per-participant statistics
    ParticipantStats {
        id: String,
        response: oneshot::Sender<Result<ParticipantStats>>,
    },

    /// Network-wide statistics
    SystemStats { response: oneshot::Sender<SystemStats> },

    /// Apply a tampering penalty
    Penalize {
        id: String,
        reason: String,
        response: oneshot::Sender<Result<PenaltyOutcome>>,
    },

    /// Distance check between two participants
    VerifyProximity {
        sender_id: String,
        receiver_id: String,
        max_distance_km: f64,
        response: oneshot::Sender<Result<bool>>,
    },

    /// Snapshot of every block
    GetChain { response: oneshot::Sender<Vec<Block>> },

    /// Most recent block
    GetLatestBlock { response: oneshot::Sender<Block> },

    /// Pool contents
    GetPendingTransactions { response: oneshot::Sender<Vec<Transaction>> },

    /// Participant snapshot
    GetParticipant {
        id: String,
        response: oneshot::Sender<Result<Participant>>,
    },

    /// Inclusion proof
    GetMerkleProof {
        block_index: u64,
        tx_index: usize,
        response: oneshot::Sender<Result<MerkleProof>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the ledger
#[derive(Debug)]
pub struct LedgerActor {
    ledger: Ledger,
    mailbox: mpsc::Receiver<LedgerCommand>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Ledger, mailbox: mpsc::Receiver<LedgerCommand>) -> Self {
        Self { ledger, mailbox }
    }

    /// Process commands until shutdown or until every handle is dropped.
    ///
    /// Blocks the current thread; run it on a blocking-capable thread.
    pub fn run(mut self) -> Ledger {
        while let Some(command) = self.mailbox.blocking_recv() {
            if let LedgerCommand::Shutdown = command {
                tracing::info!("Ledger actor shutting down");
                break;
            }
            self.handle_command(command);
        }
        self.ledger
    }

    fn handle_command(&mut self, command: LedgerCommand) {
        // A dropped receiver means the caller gave up; nothing to report
        match command {
            LedgerCommand::RegisterParticipant {
                id,
                name,
                latitude,
                longitude,
                initial_credits,
                response,
            } => {
                let result = self
                    .ledger
                    .register_participant(&id, &name, latitude, longitude, initial_credits);
                let _ = response.send(result);
            }

            LedgerCommand::AddInventory {
                id,
                blood_type,
                quantity,
                response,
            } => {
                let _ = response.send(self.ledger.add_inventory(&id, blood_type, quantity));
            }

            LedgerCommand::ProposeTransfer {
                sender_id,
                receiver_id,
                blood_type,
                quantity,
                urgency,
                response,
            } => {
                let result = self.ledger.propose_transfer(
                    &sender_id,
                    &receiver_id,
                    blood_type,
                    quantity,
                    &urgency,
                );
                let _ = response.send(result);
            }

            LedgerCommand::Mine {
                miner_id,
                cancel,
                response,
            } => {
                let result = self.ledger.mine_with_cancel(&miner_id, &cancel);
                if let Err(Error::Cancelled) = &result {
                    tracing::info!(miner = %miner_id, "Mining cancelled");
                }
                let _ = response.send(result);
            }

            LedgerCommand::ValidateChain { response } => {
                let _ = response.send(self.ledger.validate_chain());
            }

            LedgerCommand::ParticipantStats { id, response } => {
                let _ = response.send(self.ledger.participant_stats(&id));
            }

            LedgerCommand::SystemStats { response } => {
                let _ = response.send(self.ledger.system_stats());
            }

            LedgerCommand::Penalize { id, reason, response } => {
                let _ = response.send(self.ledger.penalize(&id, &reason));
            }

            LedgerCommand::VerifyProximity {
                sender_id,
                receiver_id,
                max_distance_km,
                response,
            } => {
                let result = self
                    .ledger
                    .verify_proximity(&sender_id, &receiver_id, max_distance_km);
                let _ = response.send(result);
            }

            LedgerCommand::GetChain { response } => {
                let _ = response.send(self.ledger.chain().blocks().to_vec());
            }

            LedgerCommand::GetLatestBlock { response } => {
                let _ = response.send(self.ledger.latest_block().clone());
            }

            LedgerCommand::GetPendingTransactions { response } => {
                let _ = response.send(self.ledger.pending_transactions());
            }

            LedgerCommand::GetParticipant { id, response } => {
                let _ = response.send(self.ledger.participant(&id).cloned());
            }

            LedgerCommand::GetMerkleProof {
                block_index,
                tx_index,
                response,
            } => {
                let _ = response.send(self.ledger.merkle_proof(block_index, tx_index));
            }

            LedgerCommand::Shutdown => {
                // Handled in run loop
            }
        }
    }
}

/// Handle for sending commands to the actor
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerCommand>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerCommand>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> LedgerCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(command(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Register a participant
    pub async fn register_participant(
        &self,
        id: &str,
        name: &str,
        latitude: f64,
        longitude: f64,
        initial_credits: i64,
    ) -> Result<Transaction> {
        self.request(|response| LedgerCommand::RegisterParticipant {
            id: id.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
            initial_credits,
            response,
        })
        .await?
    }

    /// Stock inventory
    pub async fn add_inventory(
        &self,
        id: &str,
        blood_type: BloodType,
        quantity: u64,
    ) -> Result<Transaction> {
        self.request(|response| LedgerCommand::AddInventory {
            id: id.to_string(),
            blood_type,
            quantity,
            response,
        })
        .await?
    }

    /// Validate and queue a transfer
    pub async fn propose_transfer(
        &self,
        sender_id: &str,
        receiver_id: &str,
        blood_type: BloodType,
        quantity: u64,
        urgency: &str,
    ) -> Result<Transaction> {
        self.request(|response| LedgerCommand::ProposeTransfer {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            blood_type,
            quantity,
            urgency: urgency.to_string(),
            response,
        })
        .await?
    }

    /// Mine the next block
    pub async fn mine(&self, miner_id: &str) -> Result<Option<MiningReport>> {
        self.mine_with_cancel(miner_id, CancelToken::new()).await
    }

    /// Mine the next block; `cancel` aborts the proof-of-work search
    pub async fn mine_with_cancel(
        &self,
        miner_id: &str,
        cancel: CancelToken,
    ) -> Result<Option<MiningReport>> {
        self.request(|response| LedgerCommand::Mine {
            miner_id: miner_id.to_string(),
            cancel,
            response,
        })
        .await?
    }

    /// Check chain integrity
    pub async fn validate_chain(&self) -> Result<bool> {
        self.request(|response| LedgerCommand::ValidateChain { response })
            .await
    }

    /// Per-participant statistics
    pub async fn participant_stats(&self, id: &str) -> Result<ParticipantStats> {
        self.request(|response| LedgerCommand::ParticipantStats {
            id: id.to_string(),
            response,
        })
        .await?
    }

    /// Network-wide statistics
    pub async fn system_stats(&self) -> Result<SystemStats> {
        self.request(|response| LedgerCommand::SystemStats { response })
            .await
    }

    /// Apply a tampering penalty
    pub async fn penalize(&self, id: &str, reason: &str) -> Result<PenaltyOutcome> {
        self.request(|response| LedgerCommand::Penalize {
            id: id.to_string(),
            reason: reason.to_string(),
            response,
        })
        .await?
    }

    /// Whether two participants are within `max_distance_km`
    pub async fn verify_proximity(
        &self,
        sender_id: &str,
        receiver_id: &str,
        max_distance_km: f64,
    ) -> Result<bool> {
        self.request(|response| LedgerCommand::VerifyProximity {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            max_distance_km,
            response,
        })
        .await?
    }

    /// Snapshot of every block
    pub async fn chain(&self) -> Result<Vec<Block>> {
        self.request(|response| LedgerCommand::GetChain { response })
            .await
    }

    /// Most recent block
    pub async fn latest_block(&self) -> Result<Block> {
        self.request(|response| LedgerCommand::GetLatestBlock { response })
            .await
    }

    /// Pool contents in arrival order
    pub async fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        self.request(|response| LedgerCommand::GetPendingTransactions { response })
            .await
    }

    /// Participant snapshot
    pub async fn participant(&self, id: &str) -> Result<Participant> {
        self.request(|response| LedgerCommand::GetParticipant {
            id: id.to_string(),
            response,
        })
        .await?
    }

    /// Inclusion proof for a sealed transaction
    pub async fn merkle_proof(&self, block_index: u64, tx_index: usize) -> Result<MerkleProof> {
        self.request(|response| LedgerCommand::GetMerkleProof {
            block_index,
            tx_index,
            response,
        })
        .await?
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerCommand::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor on the blocking thread pool
///
/// Must be called from within a Tokio runtime.
pub fn spawn_ledger_actor(ledger: Ledger) -> LedgerHandle {
    let capacity = ledger.config().actor.mailbox_capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger, rx);

    tokio::task::spawn_blocking(move || actor.run());

    LedgerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use crate::pow::MAX_DIFFICULTY;
    use tokio::time::Duration;

    fn create_test_handle() -> LedgerHandle {
        let ledger = Ledger::new(Config::for_environment(Environment::Testing)).unwrap();
        spawn_ledger_actor(ledger)
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let handle = create_test_handle();
        assert!(handle.validate_chain().await.unwrap());

        handle.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let result = handle.system_stats().await;
        assert!(matches!(result, Err(Error::Concurrency(_))));
    }

    #[tokio::test]
    async fn test_actor_transfer_flow() {
        let handle = create_test_handle();
        handle
            .register_participant("HOSP001", "City General", 40.7128, -74.0060, 150)
            .await
            .unwrap();
        handle
            .register_participant("HOSP002", "Metro Medical", 40.7589, -73.9851, 120)
            .await
            .unwrap();
        handle.add_inventory("HOSP001", BloodType::OPos, 10).await.unwrap();
        handle
            .propose_transfer("HOSP001", "HOSP002", BloodType::OPos, 3, "urgent")
            .await
            .unwrap();
        assert_eq!(handle.pending_transactions().await.unwrap().len(), 4);

        let report = handle.mine("HOSP001").await.unwrap().unwrap();
        assert!(report.is_clean());
        assert!(handle.mine("HOSP001").await.unwrap().is_none());

        let receiver = handle.participant("HOSP002").await.unwrap();
        assert_eq!(receiver.units(BloodType::OPos), 3);
        assert_eq!(handle.chain().await.unwrap().len(), 2);
        assert_eq!(handle.latest_block().await.unwrap(), report.block);
        assert!(handle.merkle_proof(1, 3).await.unwrap().verify());
        assert!(handle.verify_proximity("HOSP001", "HOSP002", 10.0).await.unwrap());

        let stats = handle.participant_stats("HOSP001").await.unwrap();
        assert_eq!(stats.total_transactions, 3);
    }

    #[tokio::test]
    async fn test_actor_reports_errors() {
        let handle = create_test_handle();
        handle
            .register_participant("HOSP001", "City General", 40.7128, -74.0060, 150)
            .await
            .unwrap();

        let dup = handle
            .register_participant("HOSP001", "Again", 40.0, -74.0, 10)
            .await;
        assert!(matches!(dup, Err(Error::DuplicateId(_))));

        let missing = handle.penalize("NOPE", "x").await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_running_mine() {
        let mut config = Config::default();
        config.mining.difficulty = MAX_DIFFICULTY;
        let handle = spawn_ledger_actor(Ledger::new(config).unwrap());
        handle
            .register_participant("HOSP001", "City General", 40.7128, -74.0060, 150)
            .await
            .unwrap();

        let token = CancelToken::new();
        let miner = {
            let handle = handle.clone();
            let token = token.clone();
            tokio::spawn(async move { handle.mine_with_cancel("HOSP001", token).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = miner.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));

        // Actor keeps serving and nothing was consumed
        assert_eq!(handle.pending_transactions().await.unwrap().len(), 1);
        assert_eq!(handle.chain().await.unwrap().len(), 1);
        assert!(handle.validate_chain().await.unwrap());
    }
}
