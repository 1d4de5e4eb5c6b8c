use std::env;
use std::fmt;

use auth::Authenticator;
use auth::HashingConfig;
use auth::PasswordHasher;
use auth::PasswordPolicy;
use auth::TokenService;
use auth::TokenSettings;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

/// Prefix of environment variable overrides, e.g. `ACCOUNTS__JWT__SECRET`.
pub const ENV_PREFIX: &str = "ACCOUNTS";

/// Longest accepted access token lifetime (one year).
pub const MAX_ACCESS_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Largest accepted clock skew tolerance.
pub const MAX_LEEWAY_SECONDS: i64 = 60 * 60;

/// Startup configuration failures. Raised eagerly, never deferred to first use.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("jwt.secret must be set to a non-empty value")]
    MissingSecret,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Raw configuration as read from files and environment.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { http_port: 3000 }
    }
}

/// Absent `url` selects the in-memory backend.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub algorithm: String,
    pub access_ttl_minutes: i64,
    pub leeway_seconds: i64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: "HS256".to_string(),
            access_ttl_minutes: 60 * 24 * 7,
            leeway_seconds: 30,
            issuer: None,
            audience: None,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PasswordConfig {
    pub policy: PasswordPolicy,
    pub hashing: HashingConfig,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (ACCOUNTS__JWT__SECRET, ACCOUNTS__SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigurationError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(configuration.try_deserialize()?)
    }
}

/// Validated, immutable settings shared by every component.
#[derive(Clone)]
pub struct Settings {
    http_port: u16,
    database_url: Option<String>,
    token_settings: TokenSettings,
    password_policy: PasswordPolicy,
    password_hasher: PasswordHasher,
}

impl Settings {
    /// Load and validate settings from the layered configuration sources.
    ///
    /// # Errors
    /// * `ConfigurationError` - Sources could not be read or a field is invalid
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::from_config(Config::load()?)
    }

    /// Validate raw configuration.
    ///
    /// # Errors
    /// * `MissingSecret` - `jwt.secret` absent or blank
    /// * `UnsupportedAlgorithm` - Not one of `HS256`, `HS384`, `HS512`
    /// * `InvalidValue` - Out-of-range lifetime, leeway, policy or hashing cost
    pub fn from_config(config: Config) -> Result<Self, ConfigurationError> {
        let jwt = config.jwt;

        let secret = jwt
            .secret
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigurationError::MissingSecret)?;

        let algorithm = TokenSettings::hmac_algorithm(&jwt.algorithm)
            .ok_or_else(|| ConfigurationError::UnsupportedAlgorithm(jwt.algorithm.clone()))?;

        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&jwt.access_ttl_minutes) {
            return Err(ConfigurationError::InvalidValue {
                field: "jwt.access_ttl_minutes",
                reason: format!("must be between 1 and {}", MAX_ACCESS_TTL_MINUTES),
            });
        }
        if !(0..=MAX_LEEWAY_SECONDS).contains(&jwt.leeway_seconds) {
            return Err(ConfigurationError::InvalidValue {
                field: "jwt.leeway_seconds",
                reason: format!("must be between 0 and {}", MAX_LEEWAY_SECONDS),
            });
        }

        let policy = config.password.policy;
        if policy.min_length < 1 {
            return Err(ConfigurationError::InvalidValue {
                field: "password.policy.min_length",
                reason: "must be at least 1".to_string(),
            });
        }
        if policy.max_length < policy.min_length {
            return Err(ConfigurationError::InvalidValue {
                field: "password.policy.max_length",
                reason: format!("must be at least min_length ({})", policy.min_length),
            });
        }

        let password_hasher = PasswordHasher::new(config.password.hashing).map_err(|e| {
            ConfigurationError::InvalidValue {
                field: "password.hashing",
                reason: e.to_string(),
            }
        })?;

        let token_settings = TokenSettings {
            secret,
            algorithm,
            access_ttl: Duration::minutes(jwt.access_ttl_minutes),
            leeway: Duration::seconds(jwt.leeway_seconds),
            issuer: jwt.issuer.filter(|issuer| !issuer.is_empty()),
            audience: jwt.audience.filter(|audience| !audience.is_empty()),
        };

        Ok(Self {
            http_port: config.server.http_port,
            database_url: config.database.url.filter(|url| !url.trim().is_empty()),
            token_settings,
            password_policy: policy,
            password_hasher,
        })
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn token_settings(&self) -> &TokenSettings {
        &self.token_settings
    }

    pub fn password_policy(&self) -> &PasswordPolicy {
        &self.password_policy
    }

    /// Build the hashing and token component described by these settings.
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(
            self.password_hasher.clone(),
            TokenService::new(&self.token_settings),
        )
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("http_port", &self.http_port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("token_settings", &self.token_settings)
            .field("password_policy", &self.password_policy)
            .field("hash_algorithm", &self.password_hasher.algorithm())
            .finish()
    }
}
