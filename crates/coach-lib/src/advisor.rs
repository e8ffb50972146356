//! Coaching orchestration
//!
//! Composes feature extraction, risk scoring, the difficulty policy and
//! message generation into a single advice call. The advisor holds no
//! per-request state and performs no writes, so one instance serves all
//! requests concurrently.

use crate::error::CoachError;
use crate::messaging::{MessageContext, MessageGenerator};
use crate::models::{CoachingAdvice, RiskTier, UserProfile, WorkoutLog};
use crate::observability::CoachMetrics;
use crate::predictor::{recommend_difficulty, FeatureExtractor, RiskClassifier};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Coaching orchestrator
#[derive(Clone)]
pub struct Coach {
    classifier: Arc<dyn RiskClassifier>,
    messenger: Arc<dyn MessageGenerator>,
    extractor: FeatureExtractor,
    metrics: Option<CoachMetrics>,
}

impl Coach {
    /// The classifier is required; load it before building the coach
    pub fn new(classifier: Arc<dyn RiskClassifier>, messenger: Arc<dyn MessageGenerator>) -> Self {
        Self {
            classifier,
            messenger,
            extractor: FeatureExtractor::new(),
            metrics: None,
        }
    }

    /// Record inference latency into the process metrics
    pub fn with_metrics(mut self, metrics: CoachMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model_version(&self) -> &str {
        self.classifier.model_version()
    }

    pub fn message_strategy(&self) -> &'static str {
        self.messenger.strategy()
    }

    /// Produce advice for today from a user's date-ordered history.
    ///
    /// Only the most recent entries feed the features; an empty history is
    /// rejected with [`CoachError::InsufficientHistory`].
    pub async fn get_advice(
        &self,
        profile: &UserProfile,
        logs: &[WorkoutLog],
        current_condition: u8,
    ) -> Result<CoachingAdvice, CoachError> {
        let latest = logs.last().ok_or(CoachError::InsufficientHistory)?;
        let features = self
            .extractor
            .extract(logs, current_condition)
            .ok_or(CoachError::InsufficientHistory)?;
        let performance = self
            .extractor
            .recent_performance(logs)
            .ok_or(CoachError::InsufficientHistory)?;

        let started = Instant::now();
        let probability = self.classifier.predict(&features)?.clamp(0.0, 1.0);
        if let Some(metrics) = &self.metrics {
            metrics.observe_inference_latency(started.elapsed().as_secs_f64());
        }
        let risk = RiskTier::from_probability(probability);
        let recommended_difficulty = recommend_difficulty(risk, latest.difficulty);

        debug!(
            user_id = %profile.user_id,
            probability = probability,
            risk = %risk,
            current_difficulty = latest.difficulty,
            recommended_difficulty = recommended_difficulty,
            "Dropout risk scored"
        );

        let message = self
            .messenger
            .generate(&MessageContext {
                profile,
                risk,
                current_difficulty: latest.difficulty,
                recommended_difficulty,
                performance,
            })
            .await;

        Ok(CoachingAdvice {
            dropout_probability: probability,
            dropout_risk: risk,
            current_difficulty: latest.difficulty,
            recommended_difficulty,
            message: message.text,
            message_source: message.source,
            recent_performance: performance,
        })
    }
}
