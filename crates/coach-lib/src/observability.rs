//! Observability for the coaching service
//!
//! Provides:
//! - Prometheus metrics (advice and inference latency, per-tier advice counts,
//!   message fallbacks, write counters, model version)
//! - Structured JSON event logging with tracing

use crate::models::{MessageSource, RiskTier};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    Encoder, GaugeVec, Histogram, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Latency buckets in seconds; inference is sub-millisecond, remote messages take seconds
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static GLOBAL_METRICS: OnceLock<CoachMetricsInner> = OnceLock::new();

struct CoachMetricsInner {
    advice_latency_seconds: Histogram,
    inference_latency_seconds: Histogram,
    advice_total: IntCounterVec,
    message_fallbacks_total: IntCounter,
    workouts_recorded_total: IntCounter,
    profiles_created_total: IntCounter,
    model_info: GaugeVec,
}

impl CoachMetricsInner {
    fn new() -> Self {
        Self {
            advice_latency_seconds: register_histogram!(
                "coach_advice_latency_seconds",
                "End-to-end time to produce coaching advice",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register advice_latency_seconds"),

            inference_latency_seconds: register_histogram!(
                "coach_inference_latency_seconds",
                "Time spent scoring dropout risk",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            advice_total: register_int_counter_vec!(
                "coach_advice_total",
                "Coaching advice produced, by risk tier",
                &["risk"]
            )
            .expect("Failed to register advice_total"),

            message_fallbacks_total: register_int_counter!(
                "coach_message_fallbacks_total",
                "Messages served from templates after a remote failure"
            )
            .expect("Failed to register message_fallbacks_total"),

            workouts_recorded_total: register_int_counter!(
                "coach_workouts_recorded_total",
                "Workout logs accepted"
            )
            .expect("Failed to register workouts_recorded_total"),

            profiles_created_total: register_int_counter!(
                "coach_profiles_created_total",
                "Profiles created or replaced"
            )
            .expect("Failed to register profiles_created_total"),

            model_info: register_gauge_vec!(
                "coach_model_info",
                "Currently loaded dropout model",
                &["version"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide coaching metrics.
///
/// Clones share the same underlying collectors.
#[derive(Clone)]
pub struct CoachMetrics {
    _private: (),
}

impl Default for CoachMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CoachMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(CoachMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &CoachMetricsInner {
        GLOBAL_METRICS.get_or_init(CoachMetricsInner::new)
    }

    pub fn observe_advice_latency(&self, duration_secs: f64) {
        self.inner().advice_latency_seconds.observe(duration_secs);
    }

    pub fn observe_inference_latency(&self, duration_secs: f64) {
        self.inner().inference_latency_seconds.observe(duration_secs);
    }

    /// Count one advice and, if degraded, one fallback
    pub fn record_advice(&self, risk: RiskTier, source: MessageSource) {
        self.inner()
            .advice_total
            .with_label_values(&[risk.as_str()])
            .inc();
        if source.is_degraded() {
            self.inner().message_fallbacks_total.inc();
        }
    }

    pub fn inc_workouts_recorded(&self) {
        self.inner().workouts_recorded_total.inc();
    }

    pub fn inc_profiles_created(&self) {
        self.inner().profiles_created_total.inc();
    }

    pub fn set_model_version(&self, version: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

/// Render the default registry in the Prometheus text format
pub fn render_metrics() -> Result<Vec<u8>, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(buffer)
}

/// Structured logger for coaching events
///
/// Every line carries an `event` field and the service instance name.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_version: &str, message_strategy: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            model_version = %model_version,
            message_strategy = %message_strategy,
            "Coaching service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Coaching service shutting down"
        );
    }

    pub fn log_model_loaded(&self, path: &str, model_version: &str) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            path = %path,
            model_version = %model_version,
            "Dropout model loaded"
        );
    }

    pub fn log_profile_created(&self, user_id: &str, personality_type: &str) {
        info!(
            event = "profile_created",
            instance = %self.instance,
            user_id = %user_id,
            personality_type = %personality_type,
            "Profile saved"
        );
    }

    pub fn log_workout_recorded(
        &self,
        user_id: &str,
        date: &str,
        completed: bool,
        total_logs: usize,
    ) {
        info!(
            event = "workout_recorded",
            instance = %self.instance,
            user_id = %user_id,
            date = %date,
            workout_completed = completed,
            total_logs = total_logs,
            "Workout recorded"
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_advice(
        &self,
        user_id: &str,
        probability: f64,
        risk: RiskTier,
        current_difficulty: u8,
        recommended_difficulty: u8,
        source: MessageSource,
        model_version: &str,
    ) {
        info!(
            event = "advice_generated",
            instance = %self.instance,
            user_id = %user_id,
            dropout_probability = probability,
            dropout_risk = %risk,
            current_difficulty = current_difficulty,
            recommended_difficulty = recommended_difficulty,
            message_source = ?source,
            model_version = %model_version,
            "Coaching advice generated"
        );
    }

    pub fn log_message_fallback(&self, user_id: &str) {
        warn!(
            event = "message_fallback",
            instance = %self.instance,
            user_id = %user_id,
            "Coaching message served from templates"
        );
    }
}
