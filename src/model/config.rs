use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::stimulus::{StimulusKind, StimulusSettings};

const ENV_CONFIG_PATH: &str = "SCREENSHOCK_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_MODEL_API_KEY: &str = "MODEL_API_KEY";
const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
const ENV_MODEL_BASE_URL: &str = "MODEL_BASE_URL";
const ENV_GENERATION_MODEL: &str = "GENERATION_MODEL";
const ENV_EVALUATION_MODEL: &str = "EVALUATION_MODEL";
const ENV_GENERATION_TEMPERATURE: &str = "GENERATION_TEMPERATURE";
const ENV_STIMULUS_BASE_URL: &str = "STIMULUS_BASE_URL";

const DEFAULT_MODEL_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_GENERATION_MODEL: &str = "google/gemini-2.5-flash";
/// Cheaper vision-capable variant for the per-screenshot path
const DEFAULT_EVALUATION_MODEL: &str = "google/gemini-2.5-flash-lite-preview-06-17";
const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.2;
const DEFAULT_STIMULUS_BASE_URL: &str = "https://api.pavlok.com/api/v5";
const DEFAULT_STIMULUS_TIMEOUT_SECS: u64 = 10;
/// A zero timeout would fail every delivery before it is sent
const MIN_STIMULUS_TIMEOUT_SECS: u64 = 1;

/// Model settings from the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsFileConfig {
    pub generation: Option<String>,
    pub evaluation: Option<String>,
    pub temperature: Option<f32>,
}

/// Stimulus settings from the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StimulusFileConfig {
    pub kind: Option<StimulusKind>,
    pub value: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub models: ModelsFileConfig,
    #[serde(default)]
    pub stimulus: StimulusFileConfig,
}

/// Connection settings for the chat-completion backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Model identifiers and sampling defaults
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub generation: String,
    pub evaluation: String,
    pub temperature: f32,
}

/// Stimulus device settings
#[derive(Debug, Clone)]
pub struct StimulusConfig {
    pub base_url: String,
    pub settings: StimulusSettings,
    pub timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub models: ModelConfig,
    pub stimulus: StimulusConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_sources(ConfigFile::default(), |_| None)
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with variables from `env`
    ///
    /// Environment values take precedence over the file's model settings.
    pub fn from_sources(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let port = env("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000);
        let host = env("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let non_blank = |k: &String| !k.trim().is_empty();
        let api_key = env(ENV_MODEL_API_KEY)
            .filter(non_blank)
            .or_else(|| env(ENV_OPENROUTER_API_KEY).filter(non_blank));

        let backend = BackendConfig {
            base_url: env(ENV_MODEL_BASE_URL)
                .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            api_key,
        };

        let temperature = env(ENV_GENERATION_TEMPERATURE)
            .and_then(|t| t.parse().ok())
            .or(file.models.temperature)
            .unwrap_or(DEFAULT_GENERATION_TEMPERATURE);

        let models = ModelConfig {
            generation: env(ENV_GENERATION_MODEL)
                .or(file.models.generation)
                .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string()),
            evaluation: env(ENV_EVALUATION_MODEL)
                .or(file.models.evaluation)
                .unwrap_or_else(|| DEFAULT_EVALUATION_MODEL.to_string()),
            temperature,
        };

        let defaults = StimulusSettings::default();
        let stimulus = StimulusConfig {
            base_url: env(ENV_STIMULUS_BASE_URL)
                .unwrap_or_else(|| DEFAULT_STIMULUS_BASE_URL.to_string()),
            settings: StimulusSettings::new(
                file.stimulus.kind.unwrap_or(defaults.kind),
                file.stimulus.value.unwrap_or(defaults.value as u32),
            ),
            timeout_secs: stimulus_timeout(file.stimulus.timeout_secs),
        };

        Self {
            backend,
            models,
            stimulus,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config_file(&contents, path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config_file(contents: &str, path: &Path) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn stimulus_timeout(configured: Option<u64>) -> u64 {
    match configured {
        None => DEFAULT_STIMULUS_TIMEOUT_SECS,
        Some(secs) if secs < MIN_STIMULUS_TIMEOUT_SECS => {
            tracing::warn!(
                configured = secs,
                using = MIN_STIMULUS_TIMEOUT_SECS,
                "stimulus.timeout_secs too small, clamping"
            );
            MIN_STIMULUS_TIMEOUT_SECS
        }
        Some(secs) => secs,
    }
}
