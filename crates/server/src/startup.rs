//! Service assembly
//!
//! Two-phase initialisation: the classifier and the store must load before
//! the router exists, so a missing model stops the process instead of
//! failing each coaching request.

use crate::api::{AppState, ApiSettings};
use crate::config::{MessageStrategy, MessagingConfig, ServerConfig};
use anyhow::{Context, Result};
use coach_lib::{
    health::{components, HealthRegistry},
    messaging::{MessageGenerator, RemoteConfig, RemoteMessenger, TemplateMessenger},
    predictor::{load_model, RiskClassifier},
    store::{JsonFileStore, UserRepository},
    Coach, CoachMetrics, StructuredLogger,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the configured message generator
pub fn build_messenger(config: &MessagingConfig) -> Result<Arc<dyn MessageGenerator>> {
    let template = match config.seed {
        Some(seed) => TemplateMessenger::with_seed(seed),
        None => TemplateMessenger::default(),
    };

    match (config.effective_strategy(), &config.api_key) {
        (MessageStrategy::Remote, Some(key)) => {
            let remote = RemoteConfig::new(key.expose_secret().as_str())
                .with_api_url(config.api_url.as_str())
                .with_model(config.model.as_str())
                .with_timeout(Duration::from_secs(config.timeout_secs));
            let messenger = RemoteMessenger::new(remote, template)
                .context("Failed to build remote messenger")?;
            Ok(Arc::new(messenger))
        }
        _ => Ok(Arc::new(template)),
    }
}

/// Load the model and the store, then wire up shared state
pub async fn build_state(config: &ServerConfig, logger: StructuredLogger) -> Result<Arc<AppState>> {
    let health = HealthRegistry::new();
    let metrics = CoachMetrics::new();

    let classifier = load_model(&config.model_path)
        .with_context(|| format!("Cannot serve coaching without {}", config.model_path.display()))?;
    let model_version = classifier.model_version().to_string();
    metrics.set_model_version(&model_version);
    logger.log_model_loaded(&config.model_path.display().to_string(), &model_version);
    health.register(components::CLASSIFIER).await;

    let store: Arc<dyn UserRepository> = Arc::new(
        JsonFileStore::open(&config.data_path)
            .await
            .with_context(|| format!("Failed to open user store {}", config.data_path.display()))?,
    );
    info!(
        backend = store.backend(),
        path = %config.data_path.display(),
        "User store ready"
    );
    health.register(components::STORE).await;

    let messenger = build_messenger(&config.messaging)?;
    health.register(components::MESSENGER).await;

    let coach = Coach::new(Arc::new(classifier), messenger).with_metrics(metrics.clone());

    let state = AppState::new(
        coach,
        store,
        health.clone(),
        metrics,
        logger,
        ApiSettings {
            min_history: config.min_history,
            history_limit: config.history_limit,
        },
    );

    health.set_ready(true).await;
    Ok(Arc::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_strategy_by_default() {
        let messenger = build_messenger(&MessagingConfig::default()).unwrap();
        assert_eq!(messenger.strategy(), "template");
    }

    #[test]
    fn test_remote_strategy_with_key() {
        let config = MessagingConfig {
            strategy: MessageStrategy::Remote,
            api_key: Some(secrecy::SecretString::new("sk-test".to_string())),
            ..Default::default()
        };
        assert_eq!(build_messenger(&config).unwrap().strategy(), "remote");
    }

    #[tokio::test]
    async fn test_missing_model_fails_fast() {
        let builder = config::Config::builder()
            .set_override("model_path", "/nonexistent/dropout_model.onnx")
            .unwrap();
        let config = ServerConfig::from_builder(builder).unwrap();
        let result = build_state(&config, StructuredLogger::new("test")).await;
        assert!(result.is_err());
    }
}
