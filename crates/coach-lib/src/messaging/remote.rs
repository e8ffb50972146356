//! Remote text-generation messenger
//!
//! Calls an OpenAI-compatible chat completions endpoint. The call is bounded
//! by a single timeout and never retried; any failure substitutes a template
//! message marked as a fallback.

use super::template::TemplateMessenger;
use super::{MessageContext, MessageGenerator};
use crate::models::{CoachingMessage, MessageSource, RiskTier};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default bound on the whole remote call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Replies shorter than this (after trimming) are treated as unusable
pub const MIN_REMOTE_REPLY_CHARS: usize = 10;

const SYSTEM_PROMPT: &str =
    "You are a warm, upbeat workout coach helping young people keep an exercise habit.";

/// Configuration for the remote messenger
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    api_key: Secret<String>,
    /// Base URL, e.g. https://api.openai.com/v1
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
            max_tokens: 150,
            temperature: 0.7,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Error)]
enum RemoteError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("reply was empty or too short")]
    UnusableReply,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Message generator backed by a hosted language model
pub struct RemoteMessenger {
    config: RemoteConfig,
    client: Client,
    fallback: TemplateMessenger,
}

impl RemoteMessenger {
    pub fn new(config: RemoteConfig, fallback: TemplateMessenger) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            config,
            client,
            fallback,
        })
    }

    async fn request_completion(
        &self,
        context: &MessageContext<'_>,
    ) -> Result<String, RemoteError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(context),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let call = async {
            let response = self
                .client
                .post(self.config.completions_url())
                .bearer_auth(self.config.api_key.expose_secret())
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(RemoteError::Status(response.status().as_u16()));
            }

            let parsed: ChatResponse = response.json().await?;
            let text = parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content.trim().to_string())
                .unwrap_or_default();

            if text.chars().count() < MIN_REMOTE_REPLY_CHARS {
                return Err(RemoteError::UnusableReply);
            }
            Ok::<_, RemoteError>(text)
        };

        tokio::time::timeout(self.config.timeout, call)
            .await
            .map_err(|_| RemoteError::Timeout(self.config.timeout))?
    }
}

#[async_trait]
impl MessageGenerator for RemoteMessenger {
    async fn generate(&self, context: &MessageContext<'_>) -> CoachingMessage {
        match self.request_completion(context).await {
            Ok(text) => {
                debug!(user_id = %context.profile.user_id, "Remote message generated");
                CoachingMessage {
                    text,
                    source: MessageSource::Remote,
                }
            }
            Err(e) => {
                warn!(
                    user_id = %context.profile.user_id,
                    error = %e,
                    "Remote message generation failed, using template"
                );
                CoachingMessage {
                    text: self.fallback.compose(context),
                    source: MessageSource::TemplateFallback,
                }
            }
        }
    }

    fn strategy(&self) -> &'static str {
        "remote"
    }
}

fn tone_direction(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::High => "very gentle and reassuring, taking the pressure off",
        RiskTier::Medium => "friendly and supportive, acknowledging small wins",
        RiskTier::Low => "positive and motivating, encouraging growth",
    }
}

/// Prompt describing the user and today's decision
fn build_prompt(context: &MessageContext<'_>) -> String {
    let profile = context.profile;
    let perf = &context.performance;
    format!(
        "Core philosophy: failing is normal, five minutes counts as success, never compare.\n\
         \n\
         User:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Workout goal: {goal}\n\
         - Personality type: {personality}\n\
         \n\
         Current situation:\n\
         - Dropout risk: {risk}\n\
         - Current difficulty: {current}\n\
         - Recommended difficulty: {recommended}\n\
         - Recent success rate: {rate:.1}%\n\
         - Current streak: {streak} days\n\
         - Last failure: {since} days ago\n\
         \n\
         Tone: {direction}.\n\
         Write 2-3 short, casual sentences that remove any guilt about failing, \
         recognise small wins and suggest a low-pressure plan for tomorrow.\n\
         \n\
         Message:",
        name = profile.name,
        age = profile.age,
        goal = profile.workout_goal,
        personality = profile.personality_type,
        risk = context.risk,
        current = context.current_difficulty,
        recommended = context.recommended_difficulty,
        rate = perf.success_rate * 100.0,
        streak = perf.streak,
        since = perf.days_since_fail,
        direction = tone_direction(context.risk),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::FixedPicker;
    use crate::models::{RecentPerformance, UserProfile};
    use serde_json::json;
    use std::sync::Arc;

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "user_001".to_string(),
            age: 16,
            name: "Minsu".to_string(),
            workout_goal: "stamina".to_string(),
            personality_type: "encouraging".to_string(),
        }
    }

    fn context(profile: &UserProfile) -> MessageContext<'_> {
        MessageContext {
            profile,
            risk: RiskTier::Medium,
            current_difficulty: 3,
            recommended_difficulty: 2,
            performance: RecentPerformance {
                success_rate: 0.6,
                streak: 2,
                days_since_fail: 1,
            },
        }
    }

    fn messenger(url: &str, timeout: Duration) -> RemoteMessenger {
        let config = RemoteConfig::new("test-key")
            .with_api_url(url)
            .with_timeout(timeout);
        RemoteMessenger::new(config, TemplateMessenger::new(Arc::new(FixedPicker(0)))).unwrap()
    }

    #[tokio::test]
    async fn test_remote_reply_is_trimmed_and_used() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": "  Keep it light today, Minsu. Five minutes still counts!  "
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let p = profile();
        let message = messenger(&server.url(), Duration::from_secs(5))
            .generate(&context(&p))
            .await;

        mock.assert_async().await;
        assert_eq!(message.source, MessageSource::Remote);
        assert_eq!(message.text, "Keep it light today, Minsu. Five minutes still counts!");
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_template() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let p = profile();
        let message = messenger(&server.url(), Duration::from_secs(5))
            .generate(&context(&p))
            .await;

        assert_eq!(message.source, MessageSource::TemplateFallback);
        assert!(message.text.contains("Minsu"));
    }

    #[tokio::test]
    async fn test_malformed_body_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let p = profile();
        let message = messenger(&server.url(), Duration::from_secs(5))
            .generate(&context(&p))
            .await;
        assert!(message.source.is_degraded());
        assert!(!message.text.is_empty());
    }

    #[tokio::test]
    async fn test_short_reply_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" ok "}}]}"#)
            .create_async()
            .await;

        let p = profile();
        let message = messenger(&server.url(), Duration::from_secs(5))
            .generate(&context(&p))
            .await;
        assert_eq!(message.source, MessageSource::TemplateFallback);
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        let p = profile();
        let message = messenger("http://127.0.0.1:9", Duration::from_millis(500))
            .generate(&context(&p))
            .await;
        assert_eq!(message.source, MessageSource::TemplateFallback);
        assert!(!message.text.is_empty());
    }

    #[tokio::test]
    async fn test_silent_service_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let p = profile();
        let started = std::time::Instant::now();
        let message = messenger(&url, Duration::from_millis(300))
            .generate(&context(&p))
            .await;

        assert_eq!(message.source, MessageSource::TemplateFallback);
        assert!(!message.text.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }

    #[test]
    fn test_prompt_embeds_context() {
        let p = profile();
        let prompt = build_prompt(&context(&p));
        assert!(prompt.contains("Name: Minsu"));
        assert!(prompt.contains("Dropout risk: medium"));
        assert!(prompt.contains("Recent success rate: 60.0%"));
        assert!(prompt.contains("Recommended difficulty: 2"));
        assert!(prompt.contains(tone_direction(RiskTier::Medium)));
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let config = RemoteConfig::new("k").with_api_url("http://localhost:1234/v1/");
        assert_eq!(config.completions_url(), "http://localhost:1234/v1/chat/completions");
    }
}
