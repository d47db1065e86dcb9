use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{MatchingParams, ScoringWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Redis is optional; without it only the in-process cache is used
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_timeline_horizon_weeks")]
    pub timeline_horizon_weeks: f64,
    /// How many rule-ranked candidates are handed to the LLM
    #[serde(default = "default_llm_candidate_pool")]
    pub llm_candidate_pool: u16,
    /// Upper bound on architects fetched from the store per run
    #[serde(default = "default_candidate_fetch_limit")]
    pub candidate_fetch_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            min_score: default_min_score(),
            default_radius_km: default_radius_km(),
            timeline_horizon_weeks: default_timeline_horizon_weeks(),
            llm_candidate_pool: default_llm_candidate_pool(),
            candidate_fetch_limit: default_candidate_fetch_limit(),
        }
    }
}

impl MatchingSettings {
    pub fn params(&self) -> MatchingParams {
        MatchingParams {
            default_radius_km: self.default_radius_km,
            timeline_horizon_weeks: self.timeline_horizon_weeks,
            min_score: self.min_score,
        }
    }
}

fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 50 }
fn default_min_score() -> f64 { 20.0 }
fn default_radius_km() -> f64 { 50.0 }
fn default_timeline_horizon_weeks() -> f64 { 12.0 }
fn default_llm_candidate_pool() -> u16 { 10 }
fn default_candidate_fetch_limit() -> usize { 500 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_services_weight")]
    pub services: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_timeline_weight")]
    pub timeline: f64,
    #[serde(default = "default_style_weight")]
    pub style: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            services: default_services_weight(),
            location: default_location_weight(),
            budget: default_budget_weight(),
            timeline: default_timeline_weight(),
            style: default_style_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(w: &WeightsConfig) -> Self {
        ScoringWeights {
            services: w.services,
            location: w.location,
            budget: w.budget,
            timeline: w.timeline,
            style: w.style,
        }
    }
}

fn default_services_weight() -> f64 { 0.35 }
fn default_location_weight() -> f64 { 0.20 }
fn default_budget_weight() -> f64 { 0.20 }
fn default_timeline_weight() -> f64 { 0.15 }
fn default_style_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: f32,
    /// Share of the final score taken from the LLM (0-1)
    #[serde(default = "default_blend_weight")]
    pub blend_weight: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
            temperature: 0.0,
            blend_weight: default_blend_weight(),
        }
    }
}

fn default_llm_endpoint() -> String { "http://localhost:11434".to_string() }
fn default_llm_model() -> String { "llama3.1".to_string() }
fn default_llm_timeout_secs() -> u64 { 20 }
fn default_blend_weight() -> f64 { 0.6 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

fn default_leeway_secs() -> u64 { 30 }

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

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ARCHMATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ARCHMATCH__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        let settings = apply_env_overrides(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the matcher cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.scoring.weights;
        let weights = [w.services, w.location, w.budget, w.timeline, w.style];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Message("scoring weights must be non-negative".to_string()));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Message("scoring weights must have a positive sum".to_string()));
        }
        if !(0.0..=1.0).contains(&self.llm.blend_weight) {
            return Err(ConfigError::Message("llm.blend_weight must be within [0, 1]".to_string()));
        }
        if self.matching.max_limit == 0 || self.matching.default_limit == 0 {
            return Err(ConfigError::Message("matching limits must be positive".to_string()));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must be set".to_string()));
        }
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ARCHMATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Well-known variables that override config values
///
/// `DATABASE_URL` wins over `database.url`.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            server: ServerSettings { host: "127.0.0.1".to_string(), port: 8080, workers: None },
            database: DatabaseSettings {
                url: "postgres://localhost/archmatch".to_string(),
                max_connections: None,
                min_connections: None,
                acquire_timeout_secs: None,
                idle_timeout_secs: None,
            },
            cache: CacheSettings::default(),
            matching: MatchingSettings::default(),
            scoring: ScoringSettings::default(),
            llm: LlmSettings::default(),
            auth: AuthSettings { jwt_secret: "secret".to_string(), leeway_secs: 30 },
            logging: LoggingSettings::default(),
        }
    }

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::from(&WeightsConfig::default());
        assert_eq!(weights, ScoringWeights::default());
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_validate_defaults() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut s = settings();
        s.scoring.weights.budget = -0.1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut s = settings();
        s.scoring.weights = WeightsConfig { services: 0.0, location: 0.0, budget: 0.0, timeline: 0.0, style: 0.0 };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_blend_weight_range() {
        let mut s = settings();
        s.llm.blend_weight = 1.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut s = settings();
        s.auth.jwt_secret = "  ".to_string();
        assert!(s.validate().is_err());
    }
}
