use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{DomainPolicy, DEFAULT_PARALLEL_THRESHOLD};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
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
    /// Redis is optional; without it only the in-process tier is used
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
}

fn default_jwt_algorithm() -> String { "HS256".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    pub rank_timeout_ms: Option<u64>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            parallel_threshold: default_parallel_threshold(),
            rank_timeout_ms: None,
        }
    }
}

fn default_top_k() -> usize { 5 }
fn default_max_top_k() -> usize { 100 }
fn default_parallel_threshold() -> usize { DEFAULT_PARALLEL_THRESHOLD }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    /// Reject out-of-domain traits and ages instead of scoring them
    #[serde(default)]
    pub strict_mode: bool,
}

impl ScoringSettings {
    pub fn domain_policy(&self) -> DomainPolicy {
        if self.strict_mode {
            DomainPolicy::Strict
        } else {
            DomainPolicy::Lenient
        }
    }
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

impl LoggingSettings {
    /// Human-readable output instead of JSON lines
    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
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
    /// 4. Environment variables (prefixed with COMPAT_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., COMPAT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("COMPAT")
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
                Environment::with_prefix("COMPAT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Conventional unprefixed variables win over file values
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Ok(algorithm) = env::var("JWT_ALGORITHM") {
        builder = builder.set_override("auth.jwt_algorithm", algorithm)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}
