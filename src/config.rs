//! Configuration module for environment variables and application settings

use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::database::DatabaseConfig;

/// Token lifetime used when `JWT_TTL` is unset or unparseable
pub const DEFAULT_JWT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token signing configuration
    pub auth: AuthConfig,

    /// Database configuration; `None` runs on the in-memory stores
    pub database: Option<DatabaseConfig>,

    /// Browser access configuration
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin
    pub allowed_origins: Vec<String>,
    pub max_age: Option<Duration>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?;

        let jwt_ttl = match get("JWT_TTL") {
            Some(raw) => parse_duration(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring JWT_TTL={:?}: {}; using default", raw, e);
                DEFAULT_JWT_TTL
            }),
            None => DEFAULT_JWT_TTL,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("PORT must be a valid port number, got {:?}", raw))?,
            None => 8080,
        };

        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(16);

        let allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_ttl,
            },
            database: get("DATABASE_URL").map(|url| DatabaseConfig::from_url(&url, max_connections)),
            cors: CorsConfig {
                allowed_origins,
                max_age: get("CORS_MAX_AGE")
                    .and_then(|v| v.trim().parse().ok())
                    .map(Duration::from_secs),
            },
        })
    }
}

/// Parse durations written as a sequence of `<number><unit>` pairs, e.g.
/// `24h`, `90m`, `1h30m`, `45s`, `500ms`. A bare number is seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty duration");
    }
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            bail!("expected a number in {:?}", input);
        }
        let value: u64 = rest[..digits].parse()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let part = match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(60 * 60)),
            "" => bail!("missing unit in {:?}", input),
            other => bail!("unknown unit {:?} in {:?}", other, input),
        };
        total = total.saturating_add(part);
    }

    Ok(total)
}
