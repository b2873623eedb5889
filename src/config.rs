use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use thiserror::Error;

use crate::admin::AdminCredential;

/// Upper bound for `SESSION_TTL_DAYS`, about a hundred years.
pub const MAX_SESSION_TTL_DAYS: i64 = 36_500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub admin_password: AdminCredential,
    /// Session cookies expire after this many days without a request.
    pub session_ttl_days: i64,
    pub secure_cookies: bool,
    pub db_max_connections: u32,
    pub session_cleanup_period: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?;
        let admin_password =
            AdminCredential::parse(&admin_password).map_err(|e| ConfigError::Invalid {
                key: "ADMIN_PASSWORD",
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            })?;

        let session_ttl_days: i64 = parse_or(&lookup, "SESSION_TTL_DAYS", 365)?;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&session_ttl_days) {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_DAYS",
                value: session_ttl_days.to_string(),
                reason: format!("must be between 1 and {MAX_SESSION_TTL_DAYS}"),
            });
        }

        let session_cleanup_secs: u64 = parse_or(&lookup, "SESSION_CLEANUP_SECS", 3600)?;
        if session_cleanup_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_CLEANUP_SECS",
                value: session_cleanup_secs.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            database_url,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            admin_password,
            session_ttl_days,
            secure_cookies: parse_or(&lookup, "SECURE_COOKIES", false)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            session_cleanup_period: Duration::from_secs(session_cleanup_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", "gee10jali"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.session_ttl_days, 365);
        assert!(!config.secure_cookies);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.session_cleanup_period, Duration::from_secs(3600));
        assert_eq!(
            config.admin_password,
            AdminCredential::Plain("gee10jali".to_string())
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/songs"),
            ("ADMIN_PASSWORD", "pw"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("SESSION_TTL_DAYS", "7"),
            ("SECURE_COOKIES", "true"),
            ("DB_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_ttl_days, 7);
        assert!(config.secure_cookies);
        assert_eq!(config.db_max_connections, 3);
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ADMIN_PASSWORD")));
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", "pw"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                ..
            }
        ));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", "pw"),
            ("SESSION_TTL_DAYS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SESSION_TTL_DAYS",
                ..
            }
        ));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", "pw"),
            ("SESSION_TTL_DAYS", "9223372036854775807"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SESSION_TTL_DAYS",
                ..
            }
        ));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", "pw"),
            ("SESSION_CLEANUP_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SESSION_CLEANUP_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_longest_session_ttl_is_accepted() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PASSWORD", "pw"),
            ("SESSION_TTL_DAYS", "36500"),
        ]))
        .unwrap();

        assert_eq!(config.session_ttl_days, MAX_SESSION_TTL_DAYS);
        assert_eq!(
            time::Duration::days(config.session_ttl_days).whole_days(),
            MAX_SESSION_TTL_DAYS
        );
    }
}
