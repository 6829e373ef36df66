//! Environment configuration.
//!
//! Responsibility:
//! - Read settings from the environment (`.env` is honoured via dotenvy).
//! - Validate them up front so a misconfigured process fails at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Where the token verification key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    Hs256Secret(String),
    Ed25519Pem(String),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        match self {
            Self::Hs256Secret(_) => f.write_str("Hs256Secret(..)"),
            Self::Ed25519Pem(_) => f.write_str("Ed25519Pem(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_key: KeySource,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub auth_admin_audience: Option<String>,
    pub auth_leeway_seconds: u64,

    pub http_timeout: Duration,
    pub http_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV"));

        // PEM wins when both are present.
        let auth_key = match (var("AUTH_JWT_PUBLIC_KEY_PEM"), var("AUTH_JWT_SECRET")) {
            (Some(pem), _) => KeySource::Ed25519Pem(pem.replace("\\n", "\n")),
            (None, Some(secret)) => KeySource::Hs256Secret(secret),
            (None, None) => return Err(ConfigError::Missing("AUTH_JWT_SECRET")),
        };

        let auth_leeway_seconds = match var("AUTH_LEEWAY_SECONDS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("AUTH_LEEWAY_SECONDS"))?,
            None => 60,
        };

        let http_timeout = match var("HTTP_TIMEOUT_SECONDS") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => Duration::from_secs(30),
        };

        let http_body_limit_bytes = match var("HTTP_BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        Ok(Self {
            addr,
            app_env,
            auth_key,
            auth_issuer: var("AUTH_ISSUER"),
            auth_audience: var("AUTH_AUDIENCE"),
            auth_admin_audience: var("AUTH_ADMIN_AUDIENCE"),
            auth_leeway_seconds,
            http_timeout,
            http_body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_secret_only() {
        let config = config(&[("AUTH_JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.auth_key, KeySource::Hs256Secret("s3cret".into()));
        assert_eq!(config.auth_issuer, None);
        assert_eq!(config.auth_leeway_seconds, 60);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.http_body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn key_is_required() {
        assert_eq!(
            config(&[]).unwrap_err(),
            ConfigError::Missing("AUTH_JWT_SECRET")
        );
        assert_eq!(
            config(&[("AUTH_JWT_SECRET", "  ")]).unwrap_err(),
            ConfigError::Missing("AUTH_JWT_SECRET")
        );
    }

    #[test]
    fn pem_wins_and_unescapes_newlines() {
        let config = config(&[
            ("AUTH_JWT_SECRET", "s3cret"),
            ("AUTH_JWT_PUBLIC_KEY_PEM", "-----BEGIN-----\\nabc\\n-----END-----"),
        ])
        .unwrap();

        assert_eq!(
            config.auth_key,
            KeySource::Ed25519Pem("-----BEGIN-----\nabc\n-----END-----".into())
        );
    }

    #[test]
    fn invalid_numbers_are_reported() {
        assert_eq!(
            config(&[("AUTH_JWT_SECRET", "s"), ("PORT", "http")]).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
        assert_eq!(
            config(&[("AUTH_JWT_SECRET", "s"), ("HTTP_TIMEOUT_SECONDS", "0")]).unwrap_err(),
            ConfigError::Invalid("HTTP_TIMEOUT_SECONDS")
        );
    }

    #[test]
    fn production_aliases() {
        let config = config(&[("AUTH_JWT_SECRET", "s"), ("APP_ENV", "PROD")]).unwrap();
        assert!(config.app_env.is_production());
    }

    #[test]
    fn debug_hides_key_material() {
        let config = config(&[("AUTH_JWT_SECRET", "s3cret")]).unwrap();
        assert!(!format!("{config:?}").contains("s3cret"));
    }
}
