//! # 远端模型列表
//!
//! 调用 provider 的 `GET {endpoint}/models` 获取可用模型。
//! 任何失败（provider 不存在、网络错误、超时、非 2xx、响应无法解析）都返回空列表。

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, warn};

use crate::dao::provider::get_llm_config_by_provider;

/// `data` 数组中的一项；除 `id` 外的字段缺失或为 null 都接受
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteModel {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub owned_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteModelList {
    data: Vec<RemoteModel>,
}

/// 远端模型列表客户端
#[derive(Debug, Clone)]
pub struct RemoteCatalogClient {
    http: HttpClient,
}

impl RemoteCatalogClient {
    /// 使用给定超时创建客户端
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("llm_admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// 使用已构建好的 reqwest 客户端
    pub fn with_http_client(http: HttpClient) -> Self {
        Self { http }
    }

    /// 请求 `{endpoint}/models`
    pub async fn list_models(&self, endpoint: &str, apikey: Option<&str>) -> Result<Vec<RemoteModel>, reqwest::Error> {
        let url = format!("{}/models", endpoint.trim_end_matches('/'));
        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(apikey) = apikey {
            request = request.bearer_auth(apikey);
        }

        let response = request.send().await?.error_for_status()?;
        let body: RemoteModelList = response.json().await?;
        Ok(body.data)
    }
}

/// 获取 provider 的远端模型列表，失败时返回空列表
pub async fn fetch_remote_model_catalog(
    pool: &SqlitePool,
    client: &RemoteCatalogClient,
    provider_id: &str,
) -> Vec<RemoteModel> {
    let config = match get_llm_config_by_provider(pool, provider_id).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            warn!(provider = %provider_id, "Remote catalog requested for unknown provider");
            return Vec::new();
        }
        Err(e) => {
            warn!(provider = %provider_id, error = %e, "Failed to resolve provider config");
            return Vec::new();
        }
    };

    let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.is_empty()) else {
        warn!(provider = %provider_id, "Provider has no endpoint configured");
        return Vec::new();
    };

    match client.list_models(endpoint, config.apikey.as_deref()).await {
        Ok(models) => {
            debug!(provider = %provider_id, count = models.len(), "Fetched remote models");
            models
        }
        Err(e) => {
            warn!(provider = %provider_id, error = %e, "Failed to fetch remote models");
            Vec::new()
        }
    }
}
