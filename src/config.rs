//! Configuration module for FreshKart.

use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;

use crate::{FreshkartError, Result};

/// Minimum accepted length for the session signing secret.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Reverse proxies whose `X-Forwarded-For`/`X-Real-IP` headers are
    /// believed. Empty means the socket peer is always the client.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            trusted_proxies: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/freshkart.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Separate JSON file receiving only security audit events.
    #[serde(default)]
    pub audit_file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/freshkart.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            format: LogFormat::default(),
            audit_file: None,
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Argon2Config {
    /// Memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub memory_kib: u32,
    /// Number of iterations.
    #[serde(default = "default_argon2_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_argon2_parallelism")]
    pub parallelism: u32,
}

fn default_argon2_memory() -> u32 {
    19456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: default_argon2_memory(),
            iterations: default_argon2_iterations(),
            parallelism: default_argon2_parallelism(),
        }
    }
}

/// Authentication and account-security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens.
    #[serde(default)]
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: u64,
    /// Consecutive failed logins before the account is locked.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    /// Lock duration in seconds.
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
    /// Email verification token lifetime in seconds.
    #[serde(default = "default_verification_ttl")]
    pub verification_token_ttl_secs: u64,
    /// Password reset token lifetime in seconds.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_secs: u64,
    /// Base URL used to build verification and reset links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Password hashing cost.
    #[serde(default)]
    pub argon2: Argon2Config,
}

fn default_session_expiry() -> u64 {
    30 * 24 * 60 * 60
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_lockout_secs() -> u64 {
    15 * 60
}

fn default_verification_ttl() -> u64 {
    24 * 60 * 60
}

fn default_reset_ttl() -> u64 {
    10 * 60
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_expiry_secs: default_session_expiry(),
            max_login_attempts: default_max_login_attempts(),
            lockout_secs: default_lockout_secs(),
            verification_token_ttl_secs: default_verification_ttl(),
            reset_token_ttl_secs: default_reset_ttl(),
            frontend_url: default_frontend_url(),
            argon2: Argon2Config::default(),
        }
    }
}

/// Longest accepted duration setting (ten years).
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn duration_setting(name: &str, secs: u64) -> Result<chrono::Duration> {
    i64::try_from(secs)
        .ok()
        .filter(|_| secs <= MAX_DURATION_SECS)
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| {
            FreshkartError::Config(format!(
                "auth.{name} must be at most {MAX_DURATION_SECS} seconds"
            ))
        })
}

impl AuthConfig {
    /// Session token lifetime.
    pub fn session_expiry(&self) -> Result<chrono::Duration> {
        duration_setting("session_expiry_secs", self.session_expiry_secs)
    }

    /// Lock duration.
    pub fn lockout(&self) -> Result<chrono::Duration> {
        duration_setting("lockout_secs", self.lockout_secs)
    }

    pub fn verification_token_ttl(&self) -> Result<chrono::Duration> {
        duration_setting("verification_token_ttl_secs", self.verification_token_ttl_secs)
    }

    pub fn reset_token_ttl(&self) -> Result<chrono::Duration> {
        duration_setting("reset_token_ttl_secs", self.reset_token_ttl_secs)
    }
}

/// A request quota: `max_requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuotaConfig {
    /// Requests allowed per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl QuotaConfig {
    /// Create a quota.
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

/// Per-IP rate limits for each protected action.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Login attempts.
    #[serde(default = "default_login_quota")]
    pub login: QuotaConfig,
    /// Registrations.
    #[serde(default = "default_register_quota")]
    pub register: QuotaConfig,
    /// Forgot/reset password requests.
    #[serde(default = "default_password_reset_quota")]
    pub password_reset: QuotaConfig,
    /// Verification email resends.
    #[serde(default = "default_resend_quota")]
    pub resend_verification: QuotaConfig,
    /// Everything else under `/api`.
    #[serde(default = "default_api_quota")]
    pub api: QuotaConfig,
}

fn default_login_quota() -> QuotaConfig {
    QuotaConfig::new(20, 15 * 60)
}

fn default_register_quota() -> QuotaConfig {
    QuotaConfig::new(10, 60 * 60)
}

fn default_password_reset_quota() -> QuotaConfig {
    QuotaConfig::new(10, 60 * 60)
}

fn default_resend_quota() -> QuotaConfig {
    QuotaConfig::new(10, 15 * 60)
}

fn default_api_quota() -> QuotaConfig {
    QuotaConfig::new(100, 15 * 60)
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login: default_login_quota(),
            register: default_register_quota(),
            password_reset: default_password_reset_quota(),
            resend_verification: default_resend_quota(),
            api: default_api_quota(),
        }
    }
}

/// CAPTCHA configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// reCAPTCHA secret key. Empty disables verification.
    #[serde(default)]
    pub secret: String,
    /// Verification endpoint.
    #[serde(default = "default_captcha_verify_url")]
    pub verify_url: String,
}

fn default_captcha_verify_url() -> String {
    "https://www.google.com/recaptcha/api/siteverify".to_string()
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            verify_url: default_captcha_verify_url(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// CAPTCHA configuration.
    #[serde(default)]
    pub captcha: CaptchaConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FreshkartError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FreshkartError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FRESHKART_JWT_SECRET`: session signing secret
    /// - `FRESHKART_RECAPTCHA_SECRET`: reCAPTCHA secret key
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_env("FRESHKART_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(secret) = non_empty_env("FRESHKART_RECAPTCHA_SECRET") {
            self.captcha.secret = secret;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(FreshkartError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via FRESHKART_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(FreshkartError::Config(format!(
                "jwt_secret must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }
        if self.auth.max_login_attempts == 0 {
            return Err(FreshkartError::Config(
                "max_login_attempts must be greater than 0".to_string(),
            ));
        }
        self.auth.session_expiry()?;
        self.auth.lockout()?;
        self.auth.verification_token_ttl()?;
        self.auth.reset_token_ttl()?;
        let quotas = [
            ("login", self.rate_limit.login),
            ("register", self.rate_limit.register),
            ("password_reset", self.rate_limit.password_reset),
            ("resend_verification", self.rate_limit.resend_verification),
            ("api", self.rate_limit.api),
        ];
        for (name, quota) in quotas {
            if quota.max_requests == 0 || quota.window_secs == 0 {
                return Err(FreshkartError::Config(format!(
                    "rate_limit.{name} must allow at least one request per non-empty window"
                )));
            }
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
