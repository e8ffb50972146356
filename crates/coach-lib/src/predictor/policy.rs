//! Risk tiering and difficulty policy
//!
//! Maps the model's dropout probability to a risk tier and the tier to a
//! difficulty adjustment for the next workout.

use crate::models::{RiskTier, MIN_SCORE};

/// Probabilities at or above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.70;

/// Probabilities at or above this (and below high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.40;

/// Difficulty reduction applied at high risk
pub const HIGH_RISK_DIFFICULTY_DROP: u8 = 2;

/// Difficulty reduction applied at medium risk
pub const MEDIUM_RISK_DIFFICULTY_DROP: u8 = 1;

impl RiskTier {
    /// Tier for a dropout probability
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Difficulty reduction for this tier
    pub fn difficulty_drop(&self) -> u8 {
        match self {
            RiskTier::High => HIGH_RISK_DIFFICULTY_DROP,
            RiskTier::Medium => MEDIUM_RISK_DIFFICULTY_DROP,
            RiskTier::Low => 0,
        }
    }
}

/// Recommended difficulty for tomorrow, never below 1
pub fn recommend_difficulty(risk: RiskTier, current_difficulty: u8) -> u8 {
    current_difficulty
        .saturating_sub(risk.difficulty_drop())
        .max(MIN_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_SCORE;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(RiskTier::from_probability(0.70), RiskTier::High);
        assert_eq!(RiskTier::from_probability(0.6999), RiskTier::Medium);
        assert_eq!(RiskTier::from_probability(0.40), RiskTier::Medium);
        assert_eq!(RiskTier::from_probability(0.3999), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(1.0), RiskTier::High);
    }

    #[test]
    fn test_difficulty_adjustment() {
        assert_eq!(recommend_difficulty(RiskTier::High, 5), 3);
        assert_eq!(recommend_difficulty(RiskTier::High, 2), 1);
        assert_eq!(recommend_difficulty(RiskTier::Medium, 2), 1);
        assert_eq!(recommend_difficulty(RiskTier::Medium, 4), 3);
        assert_eq!(recommend_difficulty(RiskTier::Low, 4), 4);
    }

    #[test]
    fn test_difficulty_floor() {
        for current in MIN_SCORE..=MAX_SCORE {
            for risk in [RiskTier::Low, RiskTier::Medium, RiskTier::High] {
                let recommended = recommend_difficulty(risk, current);
                assert!(recommended >= 1);
                assert!(recommended <= current);
            }
        }
    }
}
