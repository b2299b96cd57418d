use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DEXSCREENER_API_URL: &str = "https://api.dexscreener.com/latest/dex";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub dexscreener_api_url: String,
    pub price_cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub upstream_max_retry: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("5000")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let dexscreener_api_url = env_map
            .get("DEXSCREENER_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_DEXSCREENER_API_URL.to_string());

        let price_cache_ttl =
            Duration::from_secs(parse_u64(&env_map, "PRICE_CACHE_TTL_SECS", 30)?);
        let upstream_timeout =
            Duration::from_millis(parse_u64(&env_map, "UPSTREAM_TIMEOUT_MS", 10_000)?);
        let upstream_max_retry =
            Duration::from_millis(parse_u64(&env_map, "UPSTREAM_MAX_RETRY_MS", 5_000)?);

        if upstream_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "UPSTREAM_TIMEOUT_MS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        Ok(Config {
            port,
            database_path,
            dexscreener_api_url,
            price_cache_ttl,
            upstream_timeout,
            upstream_max_retry,
        })
    }
}

fn parse_u64(
    env_map: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), "must be a valid u64".to_string())
        }),
        None => Ok(default),
    }
}
