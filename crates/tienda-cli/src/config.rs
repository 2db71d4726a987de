//! # Environment Configuration
//!
//! All runtime configuration comes from environment variables, loaded
//! once at startup into an [`AppConfig`] that is passed down explicitly.
//! There is no global configuration state and no configuration file.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;

use tienda_domain::TaxRate;

/// Environment variable for the database URL.
pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
/// Environment variable for the listen host.
pub const HOST_ENV_VAR: &str = "TIENDA_HOST";
/// Environment variable for the listen port.
pub const PORT_ENV_VAR: &str = "TIENDA_PORT";
/// Environment variable for the fractional tax rate, e.g. `0.21`.
pub const TAX_RATE_ENV_VAR: &str = "TIENDA_TAX_RATE";
/// Environment variable for the pool size.
pub const DB_MAX_CONNECTIONS_ENV_VAR: &str = "TIENDA_DB_MAX_CONNECTIONS";
/// Environment variable for the pool acquire timeout in seconds.
pub const DB_ACQUIRE_TIMEOUT_ENV_VAR: &str = "TIENDA_DB_ACQUIRE_TIMEOUT_SECS";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_CONNECTIONS: u32 = 50;
// Fail fast under load; a stuck transaction must not hold a worker.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Tax rate used by billing derivation.
    pub tax_rate: TaxRate,
    /// Pool size.
    pub db_max_connections: u32,
    /// Pool acquire timeout.
    pub db_acquire_timeout: Duration,
}

impl AppConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` is missing or any value fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var(DATABASE_URL_ENV_VAR)
            .map_err(|_| anyhow!("{DATABASE_URL_ENV_VAR} must be set"))?;

        let host = std::env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = parse_env(PORT_ENV_VAR)?.unwrap_or(DEFAULT_PORT);

        let tax_rate = match std::env::var(TAX_RATE_ENV_VAR) {
            Ok(raw) => {
                let rate = Decimal::from_str(&raw)
                    .with_context(|| format!("{TAX_RATE_ENV_VAR} is not a decimal: {raw:?}"))?;
                TaxRate::new(rate).with_context(|| format!("invalid {TAX_RATE_ENV_VAR}"))?
            }
            Err(_) => TaxRate::default(),
        };

        let db_max_connections =
            parse_env(DB_MAX_CONNECTIONS_ENV_VAR)?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let db_acquire_timeout = Duration::from_secs(
            parse_env(DB_ACQUIRE_TIMEOUT_ENV_VAR)?.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        );

        Ok(Self {
            database_url,
            host,
            port,
            tax_rate,
            db_max_connections,
            db_acquire_timeout,
        })
    }
}

fn parse_env<T: FromStr>(name: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("could not parse {name}: {raw:?}")),
        Err(_) => Ok(None),
    }
}
