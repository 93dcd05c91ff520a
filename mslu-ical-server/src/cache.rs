use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use mslu_ical_core::{Error, Result, cache::CacheBackend};

fn cache_err(op: &str, e: redis::RedisError) -> Error {
    Error::Cache(format!("Redis {op} failed: {e}"))
}

/// Redis-backed store for rendered responses.
///
/// Keys are namespaced under a prefix so several deployments can share one
/// Redis instance; expiry is delegated to Redis via `SET ... EX`.
#[derive(Debug, Clone)]
pub struct RedisCache {
    connection: redis::aio::MultiplexedConnection,
    prefix: String,
}

impl RedisCache {
    /// Connect to Redis at `redis_url`, namespacing all keys under `prefix`.
    pub async fn new(redis_url: &str, prefix: Option<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| cache_err("client setup", e))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| cache_err("connect", e))?;

        Ok(Self {
            connection,
            prefix: prefix.unwrap_or_else(|| "mslu-ical".to_string()),
        })
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(self.prefixed(key), value, ttl.as_secs())
            .await
            .map_err(|e| cache_err("SETEX", e))
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection.clone();
        conn.get(self.prefixed(key))
            .await
            .map_err(|e| cache_err("GET", e))
    }
}
