//! Core library for the workout adherence coach
//!
//! This crate provides:
//! - Feature extraction from workout histories
//! - ONNX-backed dropout-risk scoring and the difficulty policy
//! - Coaching message generation (templates or a remote language model)
//! - Free-text check-in interpretation
//! - User persistence, statistics and synthetic data
//! - Health checks and observability

pub mod advisor;
pub mod checkin;
pub mod error;
pub mod health;
pub mod messaging;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod stats;
pub mod store;
pub mod synthetic;

pub use advisor::Coach;
pub use checkin::{CheckIn, Mood};
pub use error::{CoachError, StoreError, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{CoachMetrics, StructuredLogger};
