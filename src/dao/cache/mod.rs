use once_cell::sync::OnceCell;
use std::time::Duration;
use std::sync::Arc;
use sqlx::SqlitePool;
use crate::dao::provider::preload_llm_configs_to_cache;
pub mod cache;

pub use cache::JsonCache;

/// 全局缓存实例：provider 配置（`llm_config:{id}`）和模型列表（`models:{id}`）
pub static GLOBAL_CACHE: OnceCell<Arc<JsonCache>> = OnceCell::new();

/// 初始化全局缓存，并预加载 provider 配置
pub async fn init_global_cache(pool: &SqlitePool, ttl_seconds: u64, max_capacity: u64) -> anyhow::Result<()> {
    let cache = JsonCache::new(Duration::from_secs(ttl_seconds), max_capacity);
    GLOBAL_CACHE.set(Arc::new(cache)).ok();

    preload_llm_configs_to_cache(pool).await?;

    Ok(())
}

/// 获取全局缓存实例；未初始化时返回 None，调用方直接走数据库
pub fn global_cache() -> Option<Arc<JsonCache>> {
    GLOBAL_CACHE.get().cloned()
}
