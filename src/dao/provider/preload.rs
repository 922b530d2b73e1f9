use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::dao::cache::global_cache;
use crate::dao::crypto::decrypt_optional;
use crate::dao::provider::{LlmSetting, get_provider_by_id, list_provider_settings};

/// Connection settings of one provider, with the API key decrypted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub api_style: String,
    pub endpoint: Option<String>,
    pub apikey: Option<String>,
}

impl LlmConfig {
    fn from_setting(setting: &LlmSetting) -> anyhow::Result<Self> {
        Ok(Self {
            provider: setting.provider.clone(),
            api_style: setting.api_style.clone(),
            endpoint: setting.endpoint.clone(),
            apikey: decrypt_optional(setting.apikey.as_deref())?,
        })
    }
}

fn cache_key(provider: &str) -> String {
    format!("llm_config:{}", provider)
}

/// 从数据库预加载所有 provider 配置到全局缓存
pub async fn preload_llm_configs_to_cache(pool: &SqlitePool) -> anyhow::Result<()> {
    let Some(cache) = global_cache() else {
        return Ok(());
    };
    let settings = list_provider_settings(pool).await
        .map_err(|e| anyhow::anyhow!("Failed to load providers from database: {}", e))?;

    info!(provider_count = settings.len(), "Preloading provider configs to cache");

    for setting in &settings {
        let config = match LlmConfig::from_setting(setting) {
            Ok(config) => config,
            Err(e) => {
                // 跳过无法解密的记录，不影响其它 provider
                error!(provider = %setting.provider, error = %e, "Failed to decrypt provider key");
                continue;
            }
        };
        cache.insert_json(cache_key(&setting.provider), &config).await?;
        debug!(provider = %setting.provider, "Cached provider config");
    }
    Ok(())
}

/// 根据 provider id 获取连接配置，优先从缓存查找
pub async fn get_llm_config_by_provider(pool: &SqlitePool, provider: &str) -> anyhow::Result<Option<LlmConfig>> {
    let cache = global_cache();
    if let Some(cache) = &cache {
        if let Some(config) = cache.get_json::<LlmConfig>(&cache_key(provider)).await {
            debug!(provider = %provider, "Provider config cache hit");
            return Ok(Some(config));
        }
    }

    let Some(setting) = get_provider_by_id(pool, provider).await? else {
        return Ok(None);
    };
    let config = LlmConfig::from_setting(&setting)?;
    if let Some(cache) = &cache {
        cache.insert_json(cache_key(provider), &config).await?;
    }
    Ok(Some(config))
}

pub async fn invalidate_llm_config(provider: &str) {
    if let Some(cache) = global_cache() {
        cache.invalidate(&cache_key(provider)).await;
    }
}
