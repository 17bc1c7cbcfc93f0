//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub content: ContentPolicy,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue("APP_ENV", s.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Config for `url` with default pool sizing
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }

    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Tunables for content handling
///
/// Drives view deduplication, reading-time estimates, excerpts and page sizes.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPolicy {
    #[serde(default = "default_view_dedup_window_secs")]
    pub view_dedup_window_secs: i64,
    #[serde(default = "default_reading_words_per_minute")]
    pub reading_words_per_minute: u32,
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            view_dedup_window_secs: default_view_dedup_window_secs(),
            reading_words_per_minute: default_reading_words_per_minute(),
            excerpt_length: default_excerpt_length(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl ContentPolicy {
    /// Window within which repeat views by one viewer are not counted
    #[must_use]
    pub fn view_dedup_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.view_dedup_window_secs)
    }

    /// Resolve a requested page size against the default and the cap
    #[must_use]
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|&n| n > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.view_dedup_window_secs < 0 {
            return Err(ConfigError::InvalidValue(
                "VIEW_DEDUP_WINDOW_SECS",
                self.view_dedup_window_secs.to_string(),
            ));
        }
        if self.reading_words_per_minute == 0 {
            return Err(ConfigError::InvalidValue(
                "READING_WORDS_PER_MINUTE",
                "0".to_string(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue("MAX_PAGE_SIZE", "0".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_PAGE_SIZE",
                self.default_page_size.to_string(),
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_app_name() -> String {
    "blog-cms".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_view_dedup_window_secs() -> i64 {
    3600 // 1 hour
}

fn default_reading_words_per_minute() -> u32 {
    200
}

fn default_excerpt_length() -> usize {
    160
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    key: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let content = ContentPolicy {
            view_dedup_window_secs: parse_or(
                &lookup,
                "VIEW_DEDUP_WINDOW_SECS",
                default_view_dedup_window_secs,
            )?,
            reading_words_per_minute: parse_or(
                &lookup,
                "READING_WORDS_PER_MINUTE",
                default_reading_words_per_minute,
            )?,
            excerpt_length: parse_or(&lookup, "EXCERPT_LENGTH", default_excerpt_length)?,
            default_page_size: parse_or(&lookup, "DEFAULT_PAGE_SIZE", default_page_size)?,
            max_page_size: parse_or(&lookup, "MAX_PAGE_SIZE", default_max_page_size)?,
        };
        content.validate()?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections,
                )?,
                min_connections: parse_or(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections,
                )?,
                acquire_timeout_secs: parse_or(
                    &lookup,
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    default_acquire_timeout_secs,
                )?,
            },
            content,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
