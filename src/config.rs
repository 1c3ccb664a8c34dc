//! Runtime configuration loaded from the environment

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[source] std::net::AddrParseError),
}

/// Upper bound for `EXPIRATION_MAX_AGE_DAYS`
pub const MAX_EXPIRATION_AGE_DAYS: i64 = 36_500;

/// Upper bound for `EXPIRATION_INTERVAL_SECS` (one year)
pub const MAX_EXPIRATION_INTERVAL_SECS: i64 = 365 * 24 * 3600;

/// Top-level configuration for the service
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub expiration: ExpirationConfig,
    pub seed: SeedConfig,
    pub upload_dir: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: var_or("APP_HOST", "0.0.0.0"),
                port: parse_var("APP_PORT", 3000)?,
            },
            database: DatabaseConfig {
                url: var_or("DATABASE_URL", "sqlite:docflow.db"),
                max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
                connect_attempts: parse_var("DB_CONNECT_ATTEMPTS", 30)?,
                connect_backoff_secs: parse_var("DB_CONNECT_BACKOFF_SECS", 2)?,
            },
            expiration: ExpirationConfig {
                interval_secs: parse_ranged(
                    "EXPIRATION_INTERVAL_SECS",
                    3600,
                    1,
                    MAX_EXPIRATION_INTERVAL_SECS,
                )? as u64,
                max_age_days: parse_ranged(
                    "EXPIRATION_MAX_AGE_DAYS",
                    7,
                    1,
                    MAX_EXPIRATION_AGE_DAYS,
                )?,
            },
            seed: SeedConfig {
                email: var_or("SEED_ADMIN_EMAIL", "super@docflow.local"),
                full_name: var_or("SEED_ADMIN_NAME", "Super Administrator"),
            },
            upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "./uploads")),
            log_filter: var_or("LOG_FILTER", "docflow=debug,tower_http=debug"),
        })
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(ConfigError::InvalidHost)?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_attempts: u32,
    pub connect_backoff_secs: u64,
}

/// Expiration sweep cadence and threshold
#[derive(Debug, Clone)]
pub struct ExpirationConfig {
    pub interval_secs: u64,
    pub max_age_days: i64,
}

impl ExpirationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Creation time at or before which a pending document is stale.
    ///
    /// `None` when the configured age is not positive or does not fit the
    /// calendar.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.max_age_days <= 0 {
            return None;
        }
        chrono::Duration::try_days(self.max_age_days).and_then(|age| now.checked_sub_signed(age))
    }
}

impl Default for ExpirationConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            max_age_days: 7,
        }
    }
}

/// Super-admin account created on an empty database
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub email: String,
    pub full_name: String,
}

fn parse_ranged(name: &'static str, default: i64, min: i64, max: i64) -> Result<i64, ConfigError> {
    let value = parse_var(name, default)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_HOST",
            "APP_PORT",
            "DATABASE_URL",
            "EXPIRATION_INTERVAL_SECS",
            "EXPIRATION_MAX_AGE_DAYS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.expiration.interval_secs, 3600);
        assert_eq!(config.expiration.max_age_days, 7);
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "eighty");
        let result = AppConfig::load();
        env::remove_var("APP_PORT");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber { name: "APP_PORT", .. })
        ));
    }

    #[test]
    fn accepts_localhost_host() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
        };
        let addr = server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
    }

    #[test]
    fn rejects_unparseable_host() {
        let server = ServerConfig {
            host: "not a host".to_string(),
            port: 8080,
        };
        assert!(matches!(
            server.socket_addr(),
            Err(ConfigError::InvalidHost(_))
        ));
    }

    #[test]
    fn rejects_non_positive_max_age() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        for value in ["0", "-3"] {
            env::set_var("EXPIRATION_MAX_AGE_DAYS", value);
            let result = AppConfig::load();
            assert!(matches!(
                result,
                Err(ConfigError::OutOfRange {
                    name: "EXPIRATION_MAX_AGE_DAYS",
                    ..
                })
            ));
        }
        env::remove_var("EXPIRATION_MAX_AGE_DAYS");
    }

    #[test]
    fn rejects_huge_max_age() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EXPIRATION_MAX_AGE_DAYS", "200000000000");
        let result = AppConfig::load();
        env::remove_var("EXPIRATION_MAX_AGE_DAYS");
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange {
                name: "EXPIRATION_MAX_AGE_DAYS",
                value: 200_000_000_000,
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EXPIRATION_INTERVAL_SECS", "0");
        let result = AppConfig::load();
        env::remove_var("EXPIRATION_INTERVAL_SECS");
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange {
                name: "EXPIRATION_INTERVAL_SECS",
                ..
            })
        ));
    }

    #[test]
    fn cutoff_is_checked() {
        let now = Utc::now();
        let week = ExpirationConfig::default();
        assert_eq!(week.cutoff(now), Some(now - chrono::Duration::days(7)));

        let huge = ExpirationConfig {
            interval_secs: 3600,
            max_age_days: 200_000_000_000,
        };
        assert_eq!(huge.cutoff(now), None);

        let zero = ExpirationConfig {
            interval_secs: 3600,
            max_age_days: 0,
        };
        assert_eq!(zero.cutoff(now), None);
    }
}
