//! Service configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file
//! (`coach.toml`, or the path in `COACH_CONFIG`), then `COACH__*` environment
//! variables such as `COACH__PORT` or `COACH__MESSAGING__API_KEY`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_CONFIG_FILE: &str = "coach";
const ENV_PREFIX: &str = "COACH";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Pre-trained ONNX dropout classifier
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// JSON user store
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Logs required before coaching is offered
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Default page size for workout history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStrategy {
    Template,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_strategy")]
    pub strategy: MessageStrategy,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_remote_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pins template selection when set
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            api_url: default_api_url(),
            model: default_remote_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            seed: None,
        }
    }
}

impl MessagingConfig {
    /// Strategy actually used; remote without a key runs on templates
    pub fn effective_strategy(&self) -> MessageStrategy {
        match (self.strategy, &self.api_key) {
            (MessageStrategy::Remote, None) => {
                warn!("Remote messaging selected without an API key, using templates");
                MessageStrategy::Template
            }
            (strategy, _) => strategy,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("dropout_model.onnx")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("users_db.json")
}

fn default_min_history() -> usize {
    3
}

fn default_history_limit() -> usize {
    30
}

fn default_strategy() -> MessageStrategy {
    MessageStrategy::Template
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_remote_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl ServerConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let file =
            std::env::var("COACH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let builder = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));
        Self::from_builder(builder)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
