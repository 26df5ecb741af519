use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "VIBESTAGE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub tagging: TaggingConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub assets: AssetConfig,

    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout for the image provider.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Longest edge of the reference photo sent upstream.
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,
}

fn default_generation_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_generation_model() -> String {
    "gpt-image-1".to_string()
}

fn default_generation_timeout() -> u64 {
    180
}

fn default_max_image_dimension() -> u32 {
    1536
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            model: default_generation_model(),
            api_key: None,
            timeout_secs: default_generation_timeout(),
            max_image_dimension: default_max_image_dimension(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaggingProviderType {
    #[default]
    LmStudio,
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    #[serde(default)]
    pub provider: TaggingProviderType,

    #[serde(default = "default_tagging_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_tagging_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Replaces the built-in tagging instructions when set.
    #[serde(default)]
    pub base_prompt: Option<String>,
}

fn default_tagging_endpoint() -> String {
    "http://127.0.0.1:1234/v1".to_string()
}

fn default_tagging_model() -> String {
    "gemma-3-4b".to_string()
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            provider: TaggingProviderType::default(),
            endpoint: default_tagging_endpoint(),
            model: default_tagging_model(),
            api_key: None,
            base_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of staging workers pulling from the shared FIFO.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Minimum gap between image-provider calls, measured from completion.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_concurrency() -> usize {
    1
}

fn default_min_interval_ms() -> u64 {
    8000
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Spacing between calls to the tagging provider.
    #[serde(default = "default_tagging_interval_ms")]
    pub tagging_interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

fn default_tagging_interval_ms() -> u64 {
    1000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            tagging_interval_ms: default_tagging_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vibestage")
        .join("staged")
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum vector match score for a listing to become a lead.
    #[serde(default = "default_lead_threshold")]
    pub lead_threshold: u8,

    #[serde(default = "default_max_leads")]
    pub max_leads: usize,
}

fn default_lead_threshold() -> u8 {
    70
}

fn default_max_leads() -> usize {
    20
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            lead_threshold: default_lead_threshold(),
            max_leads: default_max_leads(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vibestage")
        .join("vibestage.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            generation: GenerationConfig::default(),
            tagging: TaggingConfig::default(),
            queue: QueueConfig::default(),
            gateway: GatewayConfig::default(),
            assets: AssetConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl Config {
    /// Load from `$VIBESTAGE_CONFIG` or the user config directory, writing
    /// a default file when none exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config {}", config_path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vibestage")
            .join("config.toml")
    }
}
