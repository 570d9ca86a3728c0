//! Central module for application-wide configuration settings.
//!
//! This module handles loading and validating configuration parameters such as
//! the listen address, database path, upload directory and session secrets from
//! the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "PROCUREMENT_BIND_ADDR";
pub const ENV_DATABASE_PATH: &str = "PROCUREMENT_DATABASE_PATH";
pub const ENV_UPLOAD_DIR: &str = "PROCUREMENT_UPLOAD_DIR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "PROCUREMENT_MAX_UPLOAD_BYTES";
pub const ENV_JWT_SECRET: &str = "PROCUREMENT_JWT_SECRET";
pub const ENV_JWT_TTL_SECS: &str = "PROCUREMENT_JWT_TTL_SECS";
pub const ENV_COOKIE_SECURE: &str = "PROCUREMENT_COOKIE_SECURE";
pub const ENV_LOG_FORMAT: &str = "PROCUREMENT_LOG_FORMAT";
pub const ENV_SEED_DEMO: &str = "PROCUREMENT_SEED_DEMO";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_PATH: &str = "procurement.db";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_JWT_TTL_SECS: u64 = 8 * 60 * 60;
const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::invalid(ENV_BIND_ADDR, err.to_string()))?;

        let jwt_secret = get(ENV_JWT_SECRET).ok_or(ConfigError::Missing(ENV_JWT_SECRET))?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::invalid(
                ENV_JWT_SECRET,
                format!("must be at least {MIN_JWT_SECRET_BYTES} bytes"),
            ));
        }

        let max_upload_bytes = parse_number(
            get(ENV_MAX_UPLOAD_BYTES),
            ENV_MAX_UPLOAD_BYTES,
            DEFAULT_MAX_UPLOAD_BYTES as u64,
        )? as usize;
        if max_upload_bytes == 0 {
            return Err(ConfigError::invalid(ENV_MAX_UPLOAD_BYTES, "must be positive"));
        }

        let jwt_ttl_secs = parse_number(get(ENV_JWT_TTL_SECS), ENV_JWT_TTL_SECS, DEFAULT_JWT_TTL_SECS)?;
        if jwt_ttl_secs == 0 {
            return Err(ConfigError::invalid(ENV_JWT_TTL_SECS, "must be positive"));
        }

        let log_format = match get(ENV_LOG_FORMAT).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    ENV_LOG_FORMAT,
                    format!("expected `pretty` or `json`, got `{other}`"),
                ))
            }
        };

        Ok(Self {
            bind_addr,
            database_path: get(ENV_DATABASE_PATH).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            upload_dir: PathBuf::from(get(ENV_UPLOAD_DIR).unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())),
            max_upload_bytes,
            jwt_secret,
            jwt_ttl: Duration::from_secs(jwt_ttl_secs),
            cookie_secure: parse_bool(get(ENV_COOKIE_SECURE), ENV_COOKIE_SECURE, false)?,
            log_format,
            seed_demo: parse_bool(get(ENV_SEED_DEMO), ENV_SEED_DEMO, false)?,
        })
    }

    /// Configuration suitable for tests: in-memory database, given upload root.
    pub fn for_tests(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_path: ":memory:".to_string(),
            upload_dir: upload_dir.into(),
            max_upload_bytes: 64 * 1024,
            jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            jwt_ttl: Duration::from_secs(DEFAULT_JWT_TTL_SECS),
            cookie_secure: false,
            log_format: LogFormat::Pretty,
            seed_demo: false,
        }
    }
}

fn parse_number(raw: Option<String>, name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|err| ConfigError::invalid(name, err.to_string())),
    }
}

fn parse_bool(raw: Option<String>, name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(default),
        Some("1" | "true" | "TRUE" | "yes" | "YES") => Ok(true),
        Some("0" | "false" | "FALSE" | "no" | "NO") => Ok(false),
        Some(other) => Err(ConfigError::invalid(name, format!("not a boolean: `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, SECRET)])).expect("valid config");
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(cfg.jwt_ttl, Duration::from_secs(DEFAULT_JWT_TTL_SECS));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(!cfg.cookie_secure);
        assert!(!cfg.seed_demo);
    }

    #[test]
    fn secret_is_required_and_must_be_long() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing(ENV_JWT_SECRET)
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "short")])),
            Err(ConfigError::Invalid { name: ENV_JWT_SECRET, .. })
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, SECRET),
            (ENV_BIND_ADDR, "0.0.0.0:8080"),
            (ENV_MAX_UPLOAD_BYTES, "2048"),
            (ENV_COOKIE_SECURE, "yes"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_SEED_DEMO, "1"),
        ]))
        .expect("valid config");
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.max_upload_bytes, 2048);
        assert!(cfg.cookie_secure);
        assert!(cfg.seed_demo);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (name, value) in [
            (ENV_BIND_ADDR, "not-an-addr"),
            (ENV_MAX_UPLOAD_BYTES, "0"),
            (ENV_JWT_TTL_SECS, "-5"),
            (ENV_COOKIE_SECURE, "maybe"),
            (ENV_LOG_FORMAT, "xml"),
        ] {
            let result = AppConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, SECRET), (name, value)]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { name: n, .. }) if n == name),
                "{name}={value} should be invalid"
            );
        }
    }
}
