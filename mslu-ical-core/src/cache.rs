use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

/// Raw byte-level cache operations implemented by concrete backends.
///
/// The core only needs opaque get/set with a TTL; eviction is the backend's
/// concern (the TTL passed to `set_raw`).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// JSON-typed convenience layer over [`CacheBackend`].
#[async_trait]
pub trait Cache: CacheBackend {
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let value_bytes = serde_json::to_vec(value)
            .map_err(|e| crate::Error::Cache(format!("Failed to serialize value: {}", e)))?;

        self.set_raw(key, &value_bytes, ttl).await
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        if let Some(raw) = self.get_raw(key).await? {
            let value = serde_json::from_slice::<T>(&raw)
                .map_err(|e| crate::Error::Cache(format!("Failed to deserialize value: {}", e)))?;

            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}

impl<T: CacheBackend> Cache for T {}

/// Key for a rendered response of `endpoint` with `params`.
///
/// Rendered responses are pure functions of the request parameters, so keys
/// built from (endpoint, parameters) are safe to share across writers.
pub fn rendered_key(endpoint: &str, params: &str) -> String {
    format!("rendered:{}:{}", endpoint, params)
}

/// Cache facade used by the service layers.
#[derive(Clone)]
pub struct CacheManager<C: CacheBackend> {
    cache: C,
}

impl<C: CacheBackend> CacheManager<C> {
    pub fn new(cache: C) -> Self
    where
        C: CacheBackend + 'static,
    {
        Self { cache }
    }

    pub async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        self.cache.set(key, value, ttl).await
    }

    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.cache.get(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_keys_are_pure_functions_of_inputs() {
        let a = rendered_key("students.ics", "112:");
        let b = rendered_key("students.ics", "112:");
        let c = rendered_key("students.ics", "113:");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn manager_round_trips_typed_values() {
        let manager = CacheManager::new(MemoryCache::default());
        assert_eq!(manager.get::<String>("k").await.expect("get succeeds"), None);

        manager
            .set("k", &"v".to_string(), Duration::from_secs(60))
            .await
            .expect("set succeeds");
        assert_eq!(
            manager.get::<String>("k").await.expect("get succeeds"),
            Some("v".to_string())
        );
    }

    #[derive(Default)]
    struct MemoryCache {
        entries: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl CacheBackend for MemoryCache {
        async fn set_raw(&self, key: &str, value: &[u8], _ttl: Duration) -> Result<()> {
            self.entries
                .lock()
                .expect("cache mutex")
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.entries.lock().expect("cache mutex").get(key).cloned())
        }
    }
}
