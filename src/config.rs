use crate::models::ScoringWeights;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// PostgreSQL settings; without a URL matches are kept in memory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_profiles_table() -> String { "profiles".to_string() }
fn default_request_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: Option<String>,
    #[serde(default)]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    /// Candidates fetched per discovery request. Stores return the first
    /// `pool_size` profiles in user-id order, so travelers past that cut
    /// are not considered until the pool is paged.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default)]
    pub default_min_compatibility: Option<u8>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            pool_size: default_pool_size(),
            default_min_compatibility: None,
        }
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }
fn default_pool_size() -> usize { 500 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_interests_weight")]
    pub interests: f64,
    #[serde(default = "default_style_exact_weight")]
    pub style_exact: f64,
    #[serde(default = "default_style_partial_weight")]
    pub style_partial: f64,
    #[serde(default = "default_language_per_shared")]
    pub language_per_shared: f64,
    #[serde(default = "default_language_cap")]
    pub language_cap: f64,
    #[serde(default = "default_fully_verified_bonus")]
    pub fully_verified: f64,
    #[serde(default = "default_id_verified_bonus")]
    pub id_verified: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            interests: default_interests_weight(),
            style_exact: default_style_exact_weight(),
            style_partial: default_style_partial_weight(),
            language_per_shared: default_language_per_shared(),
            language_cap: default_language_cap(),
            fully_verified: default_fully_verified_bonus(),
            id_verified: default_id_verified_bonus(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            interests: config.interests,
            style_exact: config.style_exact,
            style_partial: config.style_partial,
            language_per_shared: config.language_per_shared,
            language_cap: config.language_cap,
            fully_verified: config.fully_verified,
            id_verified: config.id_verified,
        }
    }
}

fn default_interests_weight() -> f64 { 40.0 }
fn default_style_exact_weight() -> f64 { 30.0 }
fn default_style_partial_weight() -> f64 { 15.0 }
fn default_language_per_shared() -> f64 { 10.0 }
fn default_language_cap() -> f64 { 20.0 }
fn default_fully_verified_bonus() -> f64 { 10.0 }
fn default_id_verified_bonus() -> f64 { 5.0 }

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
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TRIPMATE_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TRIPMATE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TRIPMATE")
                    .prefix_separator("__")
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
                Environment::with_prefix("TRIPMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables when present
///
/// `DATABASE_URL`, `SUPABASE_URL`, `SUPABASE_KEY`, `JWT_SECRET` and
/// `REDIS_URL` take precedence over the file values.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("SUPABASE_URL", "supabase.url"),
        ("SUPABASE_KEY", "supabase.api_key"),
        ("JWT_SECRET", "auth.jwt_secret"),
        ("REDIS_URL", "cache.redis_url"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_match_scoring_defaults() {
        let weights = ScoringWeights::from(&WeightsConfig::default());
        assert_eq!(weights, ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_partial_weights_table_keeps_defaults() {
        let weights: WeightsConfig = toml::from_str("interests = 50.0").unwrap();
        assert_eq!(weights.interests, 50.0);
        assert_eq!(weights.style_exact, 30.0);
        assert_eq!(weights.id_verified, 5.0);
    }

    #[test]
    fn test_matching_defaults() {
        let matching: MatchingSettings = toml::from_str("").unwrap();
        assert_eq!(matching.default_limit, 20);
        assert_eq!(matching.max_limit, 100);
        assert!(matching.default_min_compatibility.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("tripmate-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [supabase]
            url = "http://localhost:54321"
            api_key = "anon"

            [auth]
            jwt_secret = "secret"
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.supabase.profiles_table, "profiles");
        assert!(settings.database.url.is_none());
        assert_eq!(settings.scoring.weights.interests, 40.0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
