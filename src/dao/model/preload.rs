use crate::dao::cache::global_cache;
use crate::dao::model::LlmModelView;

fn cache_key(provider_id: &str) -> String {
    format!("models:{}", provider_id)
}

/// 将某个 provider 的模型列表写入缓存
pub async fn cache_provider_models(provider_id: &str, models: &[LlmModelView]) -> anyhow::Result<()> {
    if let Some(cache) = global_cache() {
        cache.insert_json(cache_key(provider_id), models).await?;
    }
    Ok(())
}

/// 从缓存中获取某个 provider 的模型列表
pub async fn get_provider_models_from_cache(provider_id: &str) -> Option<Vec<LlmModelView>> {
    global_cache()?.get_json(&cache_key(provider_id)).await
}

pub async fn invalidate_provider_models(provider_id: &str) {
    if let Some(cache) = global_cache() {
        cache.invalidate(&cache_key(provider_id)).await;
    }
}
