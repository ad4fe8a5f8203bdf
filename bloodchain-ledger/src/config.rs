//! Configuration for the ledger

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Block production
    pub mining: MiningConfig,

    /// Transfer rules
    pub contract: ContractConfig,

    /// Tampering penalties and reputation
    pub trust: TrustConfig,

    /// Single-writer front end
    pub actor: ActorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "bloodchain-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            mining: MiningConfig::default(),
            contract: ContractConfig::default(),
            trust: TrustConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

/// Mining configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Leading hex zeros required by the proof-of-work predicate
    pub difficulty: u32,

    /// Maximum transactions sealed into one block
    pub max_transactions_per_block: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            difficulty: 4,
            max_transactions_per_block: 10,
        }
    }
}

/// Transfer validation and settlement rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Sender needs at least this many blood credits
    pub min_blood_credits: i64,

    /// Maximum sender/receiver distance (km)
    pub max_distance_km: f64,

    /// Credits deducted from the sender per committed transfer
    pub transfer_cost: i64,

    /// Credits granted to the receiver per committed transfer
    pub reception_reward: i64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            min_blood_credits: 10,
            max_distance_km: 100.0,
            transfer_cost: 5,
            reception_reward: 2,
        }
    }
}

/// Trust scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Strikes a participant starts with
    pub initial_tampering_credits: i32,

    /// Reputation lost per penalty
    pub reputation_penalty: u8,

    /// Reputation floor
    pub min_reputation: u8,

    /// Reputation ceiling, also the starting reputation
    pub max_reputation: u8,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            initial_tampering_credits: 2,
            reputation_penalty: 15,
            min_reputation: 0,
            max_reputation: 100,
        }
    }
}

/// Actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Bounded mailbox size (backpressure)
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
        }
    }
}

/// Deployment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Fast mining for local work
    Development,
    /// Hard mining
    Production,
    /// Minimal mining for test suites
    Testing,
}

impl FromStr for Environment {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "testing" | "test" => Ok(Environment::Testing),
            other => Err(crate::Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

impl Config {
    /// Profile defaults
    pub fn for_environment(env: Environment) -> Self {
        let mut config = Config::default();
        config.mining.difficulty = match env {
            Environment::Development => 2,
            Environment::Production => 6,
            Environment::Testing => 1,
        };
        config
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    ///
    /// `BLOODCHAIN_ENV` picks the profile (development when unset); the
    /// remaining variables override individual values.
    pub fn from_env() -> crate::Result<Self> {
        let env = match std::env::var("BLOODCHAIN_ENV") {
            Ok(name) => name.parse()?,
            Err(_) => Environment::Development,
        };
        let mut config = Config::for_environment(env);

        if let Some(difficulty) = env_parse("BLOODCHAIN_MINING_DIFFICULTY")? {
            config.mining.difficulty = difficulty;
        }

        if let Some(max) = env_parse("BLOODCHAIN_MAX_TRANSACTIONS_PER_BLOCK")? {
            config.mining.max_transactions_per_block = max;
        }

        if let Some(distance) = env_parse("BLOODCHAIN_MAX_TRANSFER_DISTANCE_KM")? {
            config.contract.max_distance_km = distance;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the ledger cannot operate with
    pub fn validate(&self) -> crate::Result<()> {
        if self.mining.difficulty > crate::pow::MAX_DIFFICULTY {
            return Err(crate::Error::Config(format!(
                "mining.difficulty must be at most {}",
                crate::pow::MAX_DIFFICULTY
            )));
        }

        if self.mining.max_transactions_per_block == 0 {
            return Err(crate::Error::Config(
                "mining.max_transactions_per_block must be positive".to_string(),
            ));
        }

        if !self.contract.max_distance_km.is_finite() || self.contract.max_distance_km < 0.0 {
            return Err(crate::Error::Config(
                "contract.max_distance_km must be a non-negative number".to_string(),
            ));
        }

        if self.trust.min_reputation > self.trust.max_reputation || self.trust.max_reputation > 100 {
            return Err(crate::Error::Config(
                "trust reputation bounds must satisfy min <= max <= 100".to_string(),
            ));
        }

        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "actor.mailbox_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> crate::Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| crate::Error::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
