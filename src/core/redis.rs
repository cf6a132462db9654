use std::future::Future;
use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        let mut guard = self.manager.write().await;
        *guard = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let mut guard = self.manager.write().await;
        *guard = None;
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Fixed-window counter. Open (returns true) when Redis is unavailable.
    pub(crate) async fn rate_limit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, RedisError> {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return Ok(true);
        };

        let script = redis::Script::new(
            r#"
            local current = redis.call("INCR", KEYS[1])
            if current == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return current
        "#,
        );

        let current: i64 =
            script.key(key).arg(window_seconds as i64).invoke_async(&mut manager).await?;

        Ok(current <= limit as i64)
    }

    /// Read-through JSON cache. Falls back to computing directly when Redis
    /// is down or the cached payload fails to deserialize.
    pub(crate) async fn cache_get_or_compute<T, F, Fut, E>(
        &self,
        key: &str,
        ttl_seconds: u64,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let manager = { self.manager.read().await.clone() };

        if let Some(mut manager) = manager.clone() {
            match cmd("GET").arg(key).query_async::<_, Option<String>>(&mut manager).await {
                Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                    Ok(value) => return Ok(value),
                    Err(err) => {
                        tracing::warn!(error = %err, key, "Discarding undecodable cache entry");
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = %err, key, "Cache read failed; computing directly");
                }
            }
        }

        let value = compute().await?;

        if let Some(mut manager) = manager {
            if let Ok(raw) = serde_json::to_string(&value) {
                if let Err(err) = cmd("SET")
                    .arg(key)
                    .arg(raw)
                    .arg("EX")
                    .arg(ttl_seconds as i64)
                    .query_async::<_, ()>(&mut manager)
                    .await
                {
                    tracing::warn!(error = %err, key, "Cache write failed");
                }
            }
        }

        Ok(value)
    }

    pub(crate) async fn invalidate(&self, key: &str) {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return;
        };
        if let Err(err) = cmd("DEL").arg(key).query_async::<_, ()>(&mut manager).await {
            tracing::warn!(error = %err, key, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RedisHandle;
    use crate::core::config::Settings;
    use crate::test_support;
    use uuid::Uuid;

    #[tokio::test]
    async fn rate_limit_enforces_limit() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        test_support::reset_redis(settings.redis().redis_url()).await.expect("redis reset");

        let redis = RedisHandle::new(settings.redis().redis_url());
        redis.connect().await.expect("redis connect");

        let key = format!("rate-limit:{}", Uuid::new_v4());
        let first = redis.rate_limit(&key, 1, 5).await.expect("rate limit");
        let second = redis.rate_limit(&key, 1, 5).await.expect("rate limit");

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn cache_computes_once_within_ttl() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        test_support::reset_redis(settings.redis().redis_url()).await.expect("redis reset");

        let redis = RedisHandle::new(settings.redis().redis_url());
        redis.connect().await.expect("redis connect");

        let key = format!("cache:{}", Uuid::new_v4());

        let first: Result<u64, std::convert::Infallible> =
            redis.cache_get_or_compute(&key, 60, || async { Ok(7) }).await;
        let second: Result<u64, std::convert::Infallible> =
            redis.cache_get_or_compute(&key, 60, || async { Ok(99) }).await;

        assert_eq!(first.unwrap(), 7);
        assert_eq!(second.unwrap(), 7);
    }

    #[tokio::test]
    async fn cache_degrades_when_disconnected() {
        let redis = RedisHandle::new("redis://localhost:1/0".to_string());

        let value: Result<u64, std::convert::Infallible> =
            redis.cache_get_or_compute("unused", 60, || async { Ok(42) }).await;

        assert_eq!(value.unwrap(), 42);
    }
}
