//! Trust scoring: tampering penalties and blacklisting

use crate::{config::TrustConfig, types::Participant};

/// Participant state after a penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    /// Strikes left
    pub remaining_tampering_credits: i32,
    /// Reputation after the penalty
    pub reputation: u8,
    /// Blacklist flag after the penalty
    pub blacklisted: bool,
    /// This penalty flipped the blacklist flag
    pub newly_blacklisted: bool,
}

/// Trust scorer
#[derive(Debug, Clone)]
pub struct TrustScorer {
    config: TrustConfig,
}

impl TrustScorer {
    /// Create new trust scorer
    pub fn new(config: TrustConfig) -> Self {
        Self { config }
    }

    /// Apply one tampering penalty.
    ///
    /// Blacklisting is permanent: nothing here ever clears the flag.
    pub fn penalize(&self, participant: &mut Participant) -> PenaltyOutcome {
        participant.tampering_credits = participant.tampering_credits.saturating_sub(1);
        participant.reputation = participant
            .reputation
            .saturating_sub(self.config.reputation_penalty)
            .max(self.config.min_reputation);

        let newly_blacklisted = !participant.blacklisted && participant.tampering_credits <= 0;
        if newly_blacklisted {
            participant.blacklisted = true;
        }

        PenaltyOutcome {
            remaining_tampering_credits: participant.tampering_credits,
            reputation: participant.reputation,
            blacklisted: participant.blacklisted,
            newly_blacklisted,
        }
    }
}

impl Default for TrustScorer {
    fn default() -> Self {
        Self::new(TrustConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::EntityStore, types::Location};

    fn participant() -> Participant {
        let mut store = EntityStore::new(&TrustConfig::default());
        store.register("HOSP004", "Suspicious Clinic", Location::new(40.7, -74.0), 10).unwrap();
        store.get("HOSP004").unwrap().clone()
    }

    #[test]
    fn test_blacklisted_after_second_penalty() {
        let scorer = TrustScorer::default();
        let mut p = participant();

        let first = scorer.penalize(&mut p);
        assert_eq!(first.remaining_tampering_credits, 1);
        assert_eq!(first.reputation, 85);
        assert!(!first.blacklisted);

        let second = scorer.penalize(&mut p);
        assert_eq!(second.remaining_tampering_credits, 0);
        assert_eq!(second.reputation, 70);
        assert!(second.blacklisted);
        assert!(second.newly_blacklisted);
    }

    #[test]
    fn test_blacklist_is_permanent() {
        let scorer = TrustScorer::default();
        let mut p = participant();
        for _ in 0..2 {
            scorer.penalize(&mut p);
        }

        let third = scorer.penalize(&mut p);
        assert!(third.blacklisted);
        assert!(!third.newly_blacklisted);
        assert_eq!(third.remaining_tampering_credits, -1);
    }

    #[test]
    fn test_reputation_floor() {
        let scorer = TrustScorer::default();
        let mut p = participant();
        for _ in 0..10 {
            scorer.penalize(&mut p);
        }
        assert_eq!(p.reputation, 0);

        let floored = TrustScorer::new(TrustConfig {
            min_reputation: 20,
            ..TrustConfig::default()
        });
        let mut p = participant();
        for _ in 0..10 {
            floored.penalize(&mut p);
        }
        assert_eq!(p.reputation, 20);
    }
}
