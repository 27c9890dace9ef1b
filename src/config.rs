/*
 * Responsibility
 * - Read settings from the environment (PORT, signing key, token ttl, users, ...)
 * - Validate them (fail startup when something is missing or wrong)
 * - Settings are immutable once the process is running
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::credentials::UserSpec;
use crate::services::auth::token_codec::SigningKey;

/// One year.
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Transport limits applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub signing_key: SigningKey,
    pub access_token_ttl_seconds: u64,
    pub users: Vec<UserSpec>,

    pub fault_log_dir: PathBuf,
    pub http: HttpSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source. `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        // Raw UTF-8 bytes of the secret; never echoed back in errors or logs.
        let signing_key = get("AUTH_SIGNING_KEY").ok_or(ConfigError::Missing("AUTH_SIGNING_KEY"))?;
        let signing_key = SigningKey::new(signing_key.into_bytes())
            .map_err(|_| ConfigError::Invalid("AUTH_SIGNING_KEY"))?;

        let access_token_ttl_seconds = match get("ACCESS_TOKEN_TTL_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ttl| (1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(ttl))
                .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))?,
            None => 600, // 10 min
        };

        let users = match get("AUTH_USERS") {
            Some(raw) => {
                let users =
                    UserSpec::parse_list(&raw).map_err(|_| ConfigError::Invalid("AUTH_USERS"))?;
                if users.is_empty() {
                    return Err(ConfigError::Invalid("AUTH_USERS"));
                }
                users
            }
            None if app_env.is_production() => return Err(ConfigError::Missing("AUTH_USERS")),
            None => UserSpec::demo_accounts(),
        };

        let fault_log_dir = get("FAULT_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        let defaults = HttpSettings::default();
        let timeout = match get("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => defaults.timeout,
        };
        let body_limit_bytes = match get("HTTP_BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => defaults.body_limit_bytes,
        };

        Ok(Self {
            addr,
            app_env,
            signing_key,
            access_token_ttl_seconds,
            users,
            fault_log_dir,
            http: HttpSettings {
                timeout,
                body_limit_bytes,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = load(&[("AUTH_SIGNING_KEY", KEY)]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.access_token_ttl_seconds, 600);
        assert_eq!(config.users, UserSpec::demo_accounts());
        assert_eq!(config.fault_log_dir, PathBuf::from("logs"));
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn signing_key_is_required_and_long_enough() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("AUTH_SIGNING_KEY"));
        assert_eq!(
            load(&[("AUTH_SIGNING_KEY", "mysuperdupersecret")]).unwrap_err(),
            ConfigError::Invalid("AUTH_SIGNING_KEY")
        );
    }

    #[test]
    fn production_requires_explicit_users() {
        assert_eq!(
            load(&[("AUTH_SIGNING_KEY", KEY), ("APP_ENV", "prod")]).unwrap_err(),
            ConfigError::Missing("AUTH_USERS")
        );

        let config = load(&[
            ("AUTH_SIGNING_KEY", KEY),
            ("APP_ENV", "Production"),
            ("AUTH_USERS", "ops:s3cret:Admin"),
        ])
        .unwrap();
        assert_eq!(config.users, vec![UserSpec::new("ops", "s3cret", "Admin")]);
    }

    #[test]
    fn rejects_bad_numbers() {
        for (key, value) in [
            ("PORT", "http"),
            ("ACCESS_TOKEN_TTL_SECONDS", "0"),
            ("ACCESS_TOKEN_TTL_SECONDS", "-5"),
            ("ACCESS_TOKEN_TTL_SECONDS", "99999999999"),
            ("HTTP_TIMEOUT_SECONDS", "0"),
            ("HTTP_BODY_LIMIT_BYTES", "lots"),
        ] {
            assert_eq!(
                load(&[("AUTH_SIGNING_KEY", KEY), (key, value)]).unwrap_err(),
                ConfigError::Invalid(key),
                "{key}={value}"
            );
        }
    }

    #[test]
    fn debug_output_has_no_secrets() {
        let config = load(&[("AUTH_SIGNING_KEY", KEY)]).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains(KEY));
        assert!(!rendered.contains("password"));
    }
}
