use std::env;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub storage: StorageBackend,

    // highest table number an order may reference
    pub max_tables: u16,
    // offset used to decide which calendar day an order belongs to
    pub utc_offset_minutes: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "cafe_order".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            storage: StorageBackend::Mongo,
            max_tables: 50,
            utc_offset_minutes: 0,
        }
    }
}

impl Settings {
    pub fn time_zone(&self) -> FixedOffset {
        // range is checked in `load`, fall back to UTC for hand-built settings
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

pub fn load() -> Result<Settings, ConfigError> {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let mongodb_uri = env::var("MONGODB_URI").unwrap_or(defaults.mongodb_uri);
    let mongodb_db = env::var("MONGODB_DB").unwrap_or(defaults.mongodb_db);
    let host = env::var("HOST").unwrap_or(defaults.host);

    let port = match env::var("PORT") {
        Ok(raw) => parse_port(&raw)?,
        Err(_) => defaults.port,
    };

    let storage = match env::var("STORAGE") {
        Ok(raw) => parse_storage(&raw)?,
        Err(_) => defaults.storage,
    };

    let max_tables = match env::var("MAX_TABLES") {
        Ok(raw) => parse_max_tables(&raw)?,
        Err(_) => defaults.max_tables,
    };

    let utc_offset_minutes = match env::var("UTC_OFFSET_MINUTES") {
        Ok(raw) => parse_utc_offset(&raw)?,
        Err(_) => defaults.utc_offset_minutes,
    };

    Ok(Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        storage,
        max_tables,
        utc_offset_minutes,
    })
}

fn invalid(key: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason,
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| invalid("PORT", raw, "expected a port number"))
}

fn parse_storage(raw: &str) -> Result<StorageBackend, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
        "memory" => Ok(StorageBackend::Memory),
        _ => Err(invalid("STORAGE", raw, "expected `mongo` or `memory`")),
    }
}

fn parse_max_tables(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(invalid("MAX_TABLES", raw, "expected an integer between 1 and 65535")),
    }
}

fn parse_utc_offset(raw: &str) -> Result<i32, ConfigError> {
    match raw.trim().parse::<i32>() {
        Ok(n) if n.abs() < 24 * 60 => Ok(n),
        _ => Err(invalid("UTC_OFFSET_MINUTES", raw, "expected minutes within one day")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_accepts_known_backends() {
        assert_eq!(parse_storage("memory").unwrap(), StorageBackend::Memory);
        assert_eq!(parse_storage(" MongoDB ").unwrap(), StorageBackend::Mongo);
        assert!(parse_storage("sqlite").is_err());
    }

    #[test]
    fn max_tables_must_be_positive() {
        assert_eq!(parse_max_tables("12").unwrap(), 12);
        assert!(parse_max_tables("0").is_err());
        assert!(parse_max_tables("-3").is_err());
        assert!(parse_max_tables("many").is_err());
    }

    #[test]
    fn utc_offset_is_bounded_to_a_day() {
        assert_eq!(parse_utc_offset("180").unwrap(), 180);
        assert_eq!(parse_utc_offset("-300").unwrap(), -300);
        assert!(parse_utc_offset("1440").is_err());
    }

    #[test]
    fn invalid_value_names_the_key() {
        let err = parse_port("http").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn time_zone_follows_offset() {
        let settings = Settings {
            utc_offset_minutes: 120,
            ..Settings::default()
        };
        assert_eq!(settings.time_zone().local_minus_utc(), 7200);
    }
}
