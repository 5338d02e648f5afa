//! Configuration loading for huginnd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//! 4. Built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.huginn/secrets.toml` (user, must be 0600)
//! 2. `/etc/huginn/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classifier::{
    DEFAULT_SENTIMENT_MODEL, DEFAULT_THRESHOLD, DEFAULT_TOPIC_MODEL, TOPIC_HYPOTHESIS_TEMPLATE,
};
use crate::{HuginnError, Result};

/// Secret key used when none is configured. Startup warns when it is in use.
pub const DEFAULT_SECRET_KEY: &str = "you-will-never-guess";

/// Environment variables checked for the secret key, in order.
const SECRET_KEY_ENV_VARS: &[&str] = &["HUGINN_SECRET_KEY", "SECRET_KEY"];

const DEBUG_ENV_VAR: &str = "HUGINN_DEBUG";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000).
    #[serde(default = "default_address")]
    pub address: String,
    /// Verbose logging.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub secret_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            debug: false,
            secret_key: None,
        }
    }
}

impl ServerConfig {
    /// Configured secret key, or [`DEFAULT_SECRET_KEY`].
    pub fn secret_key(&self) -> &str {
        self.secret_key.as_deref().unwrap_or(DEFAULT_SECRET_KEY)
    }

    pub fn uses_default_secret_key(&self) -> bool {
        self.secret_key() == DEFAULT_SECRET_KEY
    }
}

fn default_address() -> String {
    "127.0.0.1:5000".to_string()
}

/// Topic scoring settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum score, exclusive, for a topic to be reported (default: 0.7).
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_hypothesis_template")]
    pub hypothesis_template: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            hypothesis_template: default_hypothesis_template(),
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_hypothesis_template() -> String {
    TOPIC_HYPOTHESIS_TEMPLATE.to_string()
}

/// Model identifiers. For the HuggingFace backend these are Hub model IDs;
/// for local inference either a Hub repo with an ONNX export or a local
/// directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_sentiment_model")]
    pub sentiment: String,
    #[serde(default = "default_topic_model")]
    pub topic: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            sentiment: default_sentiment_model(),
            topic: default_topic_model(),
        }
    }
}

fn default_sentiment_model() -> String {
    DEFAULT_SENTIMENT_MODEL.to_string()
}

fn default_topic_model() -> String {
    DEFAULT_TOPIC_MODEL.to_string()
}

/// Provider configurations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub huggingface: Option<HuggingFaceConfig>,
    #[serde(default)]
    pub local: Option<LocalConfig>,
}

/// HuggingFace Inference API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default = "default_hf_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_hf_timeout")]
    pub timeout_secs: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            base_url: default_hf_base_url(),
            timeout_secs: default_hf_timeout(),
        }
    }
}

fn default_hf_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_hf_timeout() -> u64 {
    60
}

/// Local inference configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Device to use: "cpu", "cuda" or "cuda:<id>" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    /// Directory for model downloads.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
}

fn default_device() -> String {
    "cpu".to_string()
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub huggingface: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Provider name → environment variable name mapping.
const PROVIDER_ENV_VARS: &[(&str, &str)] = &[("huggingface", "HF_API_KEY")];

impl Config {
    /// Load configuration from the standard locations, then apply
    /// environment overrides and validate.
    ///
    /// An explicit path must exist. Without one, a missing config file is not
    /// an error: built-in defaults are used.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without env overrides or validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = SECRET_KEY_ENV_VARS
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        {
            self.server.secret_key = Some(key);
        }

        if let Some(debug) = lookup(DEBUG_ENV_VAR).and_then(|v| parse_flag(&v)) {
            self.server.debug = debug;
        }
    }

    /// Reject values the analyzer cannot use.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.analysis.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(HuginnError::Configuration(format!(
                "analysis.threshold must be within [0, 1], got {threshold}"
            )));
        }
        let placeholders = self.analysis.hypothesis_template.matches("{}").count();
        if placeholders != 1 {
            return Err(HuginnError::Configuration(format!(
                "analysis.hypothesis_template must contain exactly one {{}} placeholder, found {placeholders}"
            )));
        }
        if self.models.sentiment.trim().is_empty() || self.models.topic.trim().is_empty() {
            return Err(HuginnError::Configuration(
                "models.sentiment and models.topic must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.huginn/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/huginn/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (providers may use env vars).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".huginn").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_checked(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/huginn/secrets.toml");
        if system_secrets.exists() {
            return Self::load_checked(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a specific secrets file after checking its permissions.
    pub fn load_checked(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(HuginnError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Get API key for a provider, falling back to the corresponding environment variable.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        let from_file = match provider {
            "huggingface" => self.huggingface.as_ref(),
            _ => None,
        }
        .map(|s| s.api_key.clone());

        from_file.or_else(|| {
            PROVIDER_ENV_VARS
                .iter()
                .find(|(name, _)| *name == provider)
                .and_then(|(_, env_var)| std::env::var(env_var).ok())
                .filter(|key| !key.is_empty())
        })
    }
}
