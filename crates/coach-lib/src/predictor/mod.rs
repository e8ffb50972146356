//! Dropout-risk prediction engine

mod features;
mod inference;
mod policy;

pub use features::{
    days_since_fail, streak, success_rate, FeatureExtractor, TrainingSample, DAYS_SINCE_FAIL_CAP,
    RECENT_WINDOW,
};
pub use inference::{fingerprint, load_model, OnnxClassifier};
pub use policy::{
    recommend_difficulty, HIGH_RISK_DIFFICULTY_DROP, HIGH_RISK_THRESHOLD,
    MEDIUM_RISK_DIFFICULTY_DROP, MEDIUM_RISK_THRESHOLD,
};

use crate::error::CoachError;
use crate::models::FeatureVector;

/// Trait for dropout classifiers
pub trait RiskClassifier: Send + Sync {
    /// Probability in [0, 1] that tomorrow's workout fails
    fn predict(&self, features: &FeatureVector) -> Result<f64, CoachError>;

    /// Get current model version
    fn model_version(&self) -> &str;
}
