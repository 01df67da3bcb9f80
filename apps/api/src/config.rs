use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
/// Keys shorter than this still load, but trigger a startup warning.
pub const RECOMMENDED_KEY_BYTES: usize = 32;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub auth: AuthConfig,
    /// New accounts start verified. There is no email confirmation flow yet.
    pub auto_verify_accounts: bool,
    pub cors_origins: Vec<String>,
    pub debug: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let ttl_minutes = optional_env("ACCESS_TOKEN_EXPIRE_MINUTES")
            .map(|v| {
                v.parse::<i64>()
                    .context("ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")
            })
            .transpose()?
            .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);

        let algorithm = optional_env("JWT_ALGORITHM").unwrap_or_else(|| "HS256".to_string());

        let auth = AuthConfig::new(
            require_env("SECRET_KEY")?.into_bytes(),
            parse_algorithm(&algorithm)?,
            ttl_minutes,
        )?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            auth,
            auto_verify_accounts: parse_bool("AUTO_VERIFY_ACCOUNTS", true)?,
            cors_origins: optional_env("CORS_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            debug: parse_bool("DEBUG", false)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Token signing settings. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct AuthConfig {
    signing_key: Vec<u8>,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl AuthConfig {
    pub fn new(signing_key: Vec<u8>, algorithm: Algorithm, ttl_minutes: i64) -> Result<Self> {
        if signing_key.is_empty() {
            bail!("SECRET_KEY must not be empty");
        }
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!("JWT_ALGORITHM must be one of HS256, HS384, HS512");
        }
        if ttl_minutes <= 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }
        let Some(default_ttl) = Duration::try_minutes(ttl_minutes)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        else {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES={ttl_minutes} is out of range");
        };

        Ok(Self {
            signing_key,
            algorithm,
            default_ttl,
        })
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn has_short_key(&self) -> bool {
        self.signing_key.len() < RECOMMENDED_KEY_BYTES
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("default_ttl_minutes", &self.default_ttl.num_minutes())
            .finish()
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm> {
    raw.trim()
        .parse::<Algorithm>()
        .map_err(|_| anyhow::anyhow!("JWT_ALGORITHM '{raw}' is not a known algorithm"))
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        None => Ok(default),
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => bail!("{key} must be a boolean, got '{other}'"),
        },
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
