use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub openweather_geocode_direct_path: String,
    pub openweather_current_path: String,
    pub openweather_forecast_path: String,
    pub upstream_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: u64,
    pub rate_limit_per_min: usize,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            openweather_geocode_direct_path: "/geo/1.0/direct".to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            upstream_timeout_secs: 15,
            cache_ttl_secs: 300,
            cache_max_entries: 1000,
            rate_limit_per_min: 120,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            port: 5000,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let openweather_api_key = env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        if openweather_api_key.is_none() {
            tracing::warn!("OPENWEATHER_API_KEY missing, upstream requests will be rejected. Set it in .env");
        }

        Ok(Config {
            openweather_api_key,
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or(defaults.openweather_base_url),
            openweather_geocode_direct_path: env::var("OPENWEATHER_GEOCODE_DIRECT_PATH")
                .unwrap_or(defaults.openweather_geocode_direct_path),
            openweather_current_path: env::var("OPENWEATHER_CURRENT_PATH")
                .unwrap_or(defaults.openweather_current_path),
            openweather_forecast_path: env::var("OPENWEATHER_FORECAST_PATH")
                .unwrap_or(defaults.openweather_forecast_path),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            cache_ttl_secs: parse_var("CACHE_TTL", defaults.cache_ttl_secs)?,
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.cache_max_entries)?,
            rate_limit_per_min: parse_var("RATE_LIMIT_PER_MIN", defaults.rate_limit_per_min)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            port: parse_var("PORT", defaults.port)?,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Proactive eviction cadence: half the TTL, never more often than every 30s.
    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs((self.cache_ttl_secs / 2).max(30))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
