use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for profile lookups
///
/// L1 is an in-process moka cache; L2 is redis, shared across instances and
/// optional. Without redis the manager runs on L1 alone.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        }
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1_cache
                    .insert(key.to_string(), json.as_bytes().to_vec())
                    .await;
                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in every configured tier
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    pub fn has_l2(&self) -> bool {
        self.redis.is_some()
    }
}

fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
    moka::future::CacheBuilder::new(l1_size)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a stored profile
    pub fn profile(name: &str) -> String {
        format!("profile:{}", name)
    }
}
