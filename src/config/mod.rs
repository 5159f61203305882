use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/billetterie";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:8888";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Tuning for the mobile-money simulator endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MobileMoneyConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub success_rate: f64,
}

impl Default for MobileMoneyConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(4000),
            success_rate: 0.9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub storage: StorageBackend,
    pub bind_addr: SocketAddr,
    pub production: bool,
    pub allowed_origins: String,
    pub admin_token: Option<String>,
    pub webhook_secret: Option<String>,
    pub mobile_money: MobileMoneyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            storage: StorageBackend::Postgres,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            production: false,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.to_string(),
            admin_token: None,
            webhook_secret: None,
            mobile_money: MobileMoneyConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset or unparsable
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = parse_or(&lookup, "HOST", defaults.bind_addr.ip());
        let port = parse_or(&lookup, "PORT", defaults.bind_addr.port());

        let min_delay_ms = parse_or(
            &lookup,
            "MOBILE_MONEY_MIN_DELAY_MS",
            defaults.mobile_money.min_delay.as_millis() as u64,
        );
        let max_delay_ms = parse_or(
            &lookup,
            "MOBILE_MONEY_MAX_DELAY_MS",
            defaults.mobile_money.max_delay.as_millis() as u64,
        )
        .max(min_delay_ms);
        let success_rate: f64 = parse_or(
            &lookup,
            "MOBILE_MONEY_SUCCESS_RATE",
            defaults.mobile_money.success_rate,
        );

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            storage: parse_or(&lookup, "STORAGE_BACKEND", defaults.storage),
            bind_addr: SocketAddr::new(host, port),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
            allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.allowed_origins),
            admin_token: non_empty(lookup("ADMIN_TOKEN")),
            webhook_secret: non_empty(lookup("MOBILE_MONEY_WEBHOOK_SECRET")),
            mobile_money: MobileMoneyConfig {
                min_delay: Duration::from_millis(min_delay_ms),
                max_delay: Duration::from_millis(max_delay_ms),
                success_rate: if success_rate.is_nan() {
                    defaults.mobile_money.success_rate
                } else {
                    success_rate.clamp(0.0, 1.0)
                },
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Config: invalid value for {} ('{}'): {}, using default", key, raw, e);
                default
            }
        },
        None => default,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
