use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// 以 JSON 字符串保存值的缓存，TTL 与容量受限
#[derive(Clone)]
pub struct JsonCache {
    cache: Arc<Cache<String, String>>,
}

impl JsonCache {
    /// 新建缓存服务
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        JsonCache {
            cache: Arc::new(cache),
        }
    }

    /// 读取并反序列化；无法解析的条目会被移除，按未命中处理
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(cache_key = %key, error = %e, "Failed to deserialize cached value");
                self.cache.invalidate(key).await;
                None
            }
        }
    }

    /// 序列化后写入缓存
    pub async fn insert_json<T: Serialize + ?Sized>(&self, key: String, value: &T) -> serde_json::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.cache.insert(key, raw).await;
        Ok(())
    }

    /// 删除某个 key
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }
}
