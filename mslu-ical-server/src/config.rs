use std::{env, time::Duration};

use anyhow::Result;

/// Server configuration read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Redis connection URL, required.
    pub redis_url: String,
    /// Key prefix for all cache entries.
    pub redis_prefix: String,
    /// Base URL of the timetable backend.
    pub schedule_base_url: String,
    /// Listen port.
    pub port: u16,
    /// Lifetime of cached rendered responses.
    pub cache_ttl: Duration,
}

const DEFAULT_SCHEDULE_BASE_URL: &str = "http://schedule.mslu.by/backend";
const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

impl Settings {
    pub fn from_env() -> Result<Self> {
        let redis_url = env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL environment variable is required"))?;

        let redis_prefix = env::var("REDIS_PREFIX").unwrap_or_else(|_| "mslu-ical".to_string());

        let schedule_base_url = env::var("SCHEDULE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SCHEDULE_BASE_URL.to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .unwrap_or(3000);

        let cache_ttl = Duration::from_secs(
            env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
        );

        Ok(Self {
            redis_url,
            redis_prefix,
            schedule_base_url,
            port,
            cache_ttl,
        })
    }
}
