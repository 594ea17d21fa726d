//! Application state and service initialization
//!
//! Builds the model gateway and services from an explicit `Config`; no
//! service reads the environment on its own.

use std::sync::Arc;

use crate::model::Config;
use crate::service::{
    CaptureEvaluator, ModelGateway, OpenAiCompatibleGateway, PolicyGenerator, StimulusClient,
};

/// Application state containing all services
pub struct AppState {
    /// Focus policy generation service
    pub policy_generator: Arc<PolicyGenerator>,
    /// Screenshot evaluation service
    pub capture_evaluator: Arc<CaptureEvaluator>,
    /// Stimulus device client
    pub stimulus_client: Arc<StimulusClient>,
}

impl AppState {
    /// Initialize all services against the configured backend
    ///
    /// Requires a model API key (`MODEL_API_KEY` or `OPENROUTER_API_KEY`).
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let api_key = config
            .backend
            .api_key
            .as_deref()
            .ok_or(AppError::MissingConfig("MODEL_API_KEY"))?;

        if !config.backend.base_url.starts_with("http://")
            && !config.backend.base_url.starts_with("https://")
        {
            return Err(AppError::InvalidConfig("MODEL_BASE_URL must be an http(s) URL"));
        }

        tracing::info!(base_url = %config.backend.base_url, "Model gateway configured");

        let gateway = OpenAiCompatibleGateway::new(&config.backend.base_url, api_key)
            .map_err(AppError::GatewayInit)?;

        Self::with_gateway(config, Arc::new(gateway))
    }

    /// Initialize services around an existing gateway
    pub fn with_gateway(
        config: &Config,
        gateway: Arc<dyn ModelGateway>,
    ) -> Result<Self, AppError> {
        let policy_generator = PolicyGenerator::new(
            Arc::clone(&gateway),
            config.models.generation.clone(),
            config.models.temperature,
        );

        let capture_evaluator = CaptureEvaluator::new(gateway, config.models.evaluation.clone());

        let stimulus_client = StimulusClient::new(&config.stimulus)
            .map_err(|e| AppError::StimulusInit(e.to_string()))?;

        Ok(Self {
            policy_generator: Arc::new(policy_generator),
            capture_evaluator: Arc::new(capture_evaluator),
            stimulus_client: Arc::new(stimulus_client),
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Model gateway could not be built
    #[error("Model gateway initialization failed: {0}")]
    GatewayInit(String),

    /// Stimulus client could not be built
    #[error("Stimulus client initialization failed: {0}")]
    StimulusInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::ConfigFile;

    #[test]
    fn test_missing_api_key() {
        let config = Config::from_sources(ConfigFile::default(), |_| None);
        assert!(matches!(
            AppState::new(&config),
            Err(AppError::MissingConfig("MODEL_API_KEY"))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config::from_sources(ConfigFile::default(), |key| match key {
            "MODEL_API_KEY" => Some("sk-test".to_string()),
            "MODEL_BASE_URL" => Some("openrouter.ai/api/v1".to_string()),
            _ => None,
        });
        assert!(matches!(
            AppState::new(&config),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_services_built_with_key() {
        let config = Config::from_sources(ConfigFile::default(), |key| {
            (key == "MODEL_API_KEY").then(|| "sk-test".to_string())
        });
        assert!(AppState::new(&config).is_ok());
    }
}
