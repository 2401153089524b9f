use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub enrichment: EnrichmentSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentSettings {
    #[serde(default = "default_enrichment_base_url")]
    pub base_url: String,
    /// Empty key disables enrichment entirely
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_enrichment_model")]
    pub model: String,
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,
    /// Outer deadline per match, covering the retry as well
    #[serde(default = "default_enrichment_deadline")]
    pub deadline_secs: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            base_url: default_enrichment_base_url(),
            api_key: String::new(),
            model: default_enrichment_model(),
            timeout_secs: default_enrichment_timeout(),
            deadline_secs: default_enrichment_deadline(),
        }
    }
}

fn default_enrichment_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_enrichment_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_enrichment_timeout() -> u64 {
    4
}
fn default_enrichment_deadline() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u16 {
    10
}
fn default_max_limit() -> u16 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    5000
}
fn default_cache_ttl() -> u64 {
    900
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_features_weight")]
    pub features: f64,
    #[serde(default = "default_size_weight")]
    pub size: f64,
    #[serde(default = "default_timeline_weight")]
    pub timeline: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            price: default_price_weight(),
            location: default_location_weight(),
            features: default_features_weight(),
            size: default_size_weight(),
            timeline: default_timeline_weight(),
        }
    }
}

fn default_price_weight() -> f64 {
    0.30
}
fn default_location_weight() -> f64 {
    0.25
}
fn default_features_weight() -> f64 {
    0.25
}
fn default_size_weight() -> f64 {
    0.15
}
fn default_timeline_weight() -> f64 {
    0.05
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with HOMEMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with HOMEMATCH_)
            // e.g., HOMEMATCH_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("HOMEMATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("HOMEMATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment overrides
///
/// OPENAI_API_KEY is checked before the prefixed form so a bare key from the
/// deployment environment is picked up without extra configuration.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let api_key = env::var("OPENAI_API_KEY")
        .or_else(|_| env::var("HOMEMATCH_ENRICHMENT__API_KEY"))
        .ok();

    let base_url = env::var("HOMEMATCH_ENRICHMENT__BASE_URL").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = api_key {
        builder = builder.set_override("enrichment.api_key", api_key)?;
    }
    if let Some(base_url) = base_url {
        builder = builder.set_override("enrichment.base_url", base_url)?;
    }

    builder.build()
}
