//! BloodChain demo driver
//!
//! Walks a five-hospital network through registration, stocking, transfers,
//! tampering penalties and mining, then prints the resulting statistics.

use anyhow::Context;
use bloodchain_ledger::{spawn_ledger_actor, BloodType, Config, Error, Ledger, LedgerHandle};

const HOSPITALS: [(&str, &str, f64, f64, i64); 5] = [
    ("HOSP001", "City General Hospital", 40.7128, -74.0060, 150),
    ("HOSP002", "Memorial Medical Center", 40.7589, -73.9851, 120),
    ("HOSP003", "Regional Blood Center", 40.7831, -73.9712, 200),
    ("HOSP004", "Emergency Care Hospital", 40.6782, -73.9442, 100),
    ("HOSP005", "University Medical Center", 40.8176, -73.9482, 180),
];

const INVENTORY: [(&str, BloodType, u64); 19] = [
    ("HOSP001", BloodType::OPos, 15),
    ("HOSP001", BloodType::APos, 10),
    ("HOSP001", BloodType::BPos, 8),
    ("HOSP001", BloodType::AbPos, 5),
    ("HOSP002", BloodType::ONeg, 12),
    ("HOSP002", BloodType::ANeg, 6),
    ("HOSP002", BloodType::BNeg, 4),
    ("HOSP002", BloodType::OPos, 20),
    ("HOSP003", BloodType::AbPos, 25),
    ("HOSP003", BloodType::AbNeg, 8),
    ("HOSP003", BloodType::APos, 15),
    ("HOSP003", BloodType::BPos, 12),
    ("HOSP004", BloodType::OPos, 10),
    ("HOSP004", BloodType::ONeg, 8),
    ("HOSP004", BloodType::APos, 6),
    ("HOSP005", BloodType::BNeg, 10),
    ("HOSP005", BloodType::AbNeg, 15),
    ("HOSP005", BloodType::ANeg, 12),
    ("HOSP005", BloodType::BPos, 18),
];

const TRANSFERS: [(&str, &str, BloodType, u64, &str); 5] = [
    ("HOSP001", "HOSP002", BloodType::OPos, 3, "urgent"),
    ("HOSP003", "HOSP004", BloodType::AbPos, 2, "normal"),
    ("HOSP002", "HOSP001", BloodType::ONeg, 1, "emergency"),
    ("HOSP005", "HOSP003", BloodType::BPos, 4, "normal"),
    ("HOSP001", "HOSP005", BloodType::APos, 2, "urgent"),
];

const MINERS: [&str; 4] = ["HOSP001", "HOSP002", "HOSP003", "HOSP005"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        difficulty = config.mining.difficulty,
        "Starting BloodChain demo"
    );

    let handle = spawn_ledger_actor(Ledger::new(config)?);

    for (id, name, lat, lon, credits) in HOSPITALS {
        handle
            .register_participant(id, name, lat, lon, credits)
            .await
            .with_context(|| format!("registering {}", id))?;
    }

    for (id, blood_type, quantity) in INVENTORY {
        handle.add_inventory(id, blood_type, quantity).await?;
    }

    for (a, b) in [("HOSP001", "HOSP002"), ("HOSP003", "HOSP004"), ("HOSP001", "HOSP005")] {
        let near = handle.verify_proximity(a, b, 10.0).await?;
        tracing::info!(a, b, within_10_km = near, "Proximity check");
    }

    for (sender, receiver, blood_type, quantity, urgency) in TRANSFERS {
        propose(&handle, sender, receiver, blood_type, quantity, urgency).await?;
    }

    handle
        .penalize("HOSP004", "Submitted blood with falsified expiry date")
        .await?;
    let outcome = handle
        .penalize("HOSP004", "Attempted to modify transaction data")
        .await?;
    tracing::info!(
        blacklisted = outcome.blacklisted,
        reputation = outcome.reputation,
        "HOSP004 penalized twice"
    );

    // Blacklisted senders are refused
    propose(&handle, "HOSP004", "HOSP001", BloodType::OPos, 2, "normal").await?;

    let mut round = 0;
    while let Some(report) = handle.mine(MINERS[round % MINERS.len()]).await? {
        tracing::info!(
            index = report.block.index,
            transactions = report.block.transactions.len(),
            validator = %report.block.validator,
            failed = report.failed_transfers.len(),
            "Block sealed"
        );
        round += 1;
    }

    anyhow::ensure!(handle.validate_chain().await?, "chain failed validation");

    for id in MINERS {
        let stats = handle.participant_stats(id).await?;
        tracing::info!(participant = id, stats = %serde_json::to_string(&stats)?, "Participant stats");
    }

    let stats = handle.system_stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    handle.shutdown().await?;
    Ok(())
}

async fn propose(
    handle: &LedgerHandle,
    sender: &str,
    receiver: &str,
    blood_type: BloodType,
    quantity: u64,
    urgency: &str,
) -> anyhow::Result<()> {
    match handle
        .propose_transfer(sender, receiver, blood_type, quantity, urgency)
        .await
    {
        Ok(tx) => {
            tracing::info!(tx_id = %tx.transaction_id, sender, receiver, "Transfer proposed");
            Ok(())
        }
        Err(Error::ValidationRejected(reason)) => {
            tracing::warn!(sender, receiver, %reason, "Transfer refused");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
