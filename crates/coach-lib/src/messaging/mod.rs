//! Coaching message generation
//!
//! Two interchangeable strategies:
//! - Template selection keyed by risk tier and personality type
//! - A remote text-generation service that falls back to templates on failure

mod remote;
mod template;

pub use remote::{RemoteConfig, RemoteMessenger, DEFAULT_REMOTE_TIMEOUT, MIN_REMOTE_REPLY_CHARS};
pub use template::{
    FixedPicker, SeededPicker, TemplateMessenger, TemplatePicker, ThreadRngPicker, YOUTH_AGE_MAX,
};

use crate::models::{CoachingMessage, RecentPerformance, RiskTier, UserProfile};
use async_trait::async_trait;

/// Everything a generator may use to phrase a message
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub profile: &'a UserProfile,
    pub risk: RiskTier,
    pub current_difficulty: u8,
    pub recommended_difficulty: u8,
    pub performance: RecentPerformance,
}

/// Trait for message generation strategies.
///
/// Implementations never fail: a strategy that cannot reach its backend
/// substitutes a template and marks the message as degraded.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, context: &MessageContext<'_>) -> CoachingMessage;

    /// Short name for logs and health output
    fn strategy(&self) -> &'static str;
}
