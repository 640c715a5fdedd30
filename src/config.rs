use std::env;

use rust_decimal::Decimal;

use crate::engine::fare::RateTable;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub rates: RateTable,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`, which returns the raw value for a key
    /// or `None` when it is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = RateTable::default();

        Ok(Self {
            http_port: parse_or_default(&lookup, "HTTP_PORT", 3000)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            event_buffer_size: parse_buffer_size(&lookup, "EVENT_BUFFER_SIZE", 1024)?,
            rates: RateTable {
                car: parse_rate(&lookup, "CAR_RATE", defaults.car)?,
                bike: parse_rate(&lookup, "BIKE_RATE", defaults.bike)?,
                cng: parse_rate(&lookup, "CNG_RATE", defaults.cng)?,
            },
        })
    }
}

fn parse_buffer_size(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, AppError> {
    let size = parse_or_default(lookup, key, default)?;
    if size == 0 {
        return Err(AppError::Internal(format!("invalid {key}: must be positive")));
    }
    Ok(size)
}

fn parse_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Decimal,
) -> Result<Decimal, AppError> {
    let rate = parse_or_default(lookup, key, default)?;
    if rate <= Decimal::ZERO {
        return Err(AppError::Internal(format!("invalid {key}: rate must be positive")));
    }
    Ok(rate)
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
