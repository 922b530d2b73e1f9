use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use anyhow::Result;
use tracing::{info, warn};

use crate::actions::remote_models::RemoteCatalogClient;
use crate::config::AppConfig;
use crate::dao::cache::init_global_cache;
use crate::dao::crypto::init_encryption_key;
use crate::dao::session::delete_expired_sessions;
use crate::dao::{init_db, init_sqlite_pool};
use crate::web::{
    handlers::{
        health_handler::health_check,
        provider_handler::{
            list_providers, list_provider_settings, list_active_providers, get_provider,
            save_provider, add_custom_provider, delete_custom_provider, save_provider_order,
            list_remote_models,
        },
        model_handler::{
            list_models, list_visible_models, set_model_selected, set_provider_model_selected,
            add_custom_model, update_custom_model, delete_custom_model, save_models_order,
            get_edit_model_form, submit_edit_model_form,
        },
    },
    middleware::cors::cors_layer,
    state::AppState,
};

pub struct WebServer {
    config: AppConfig,
}

impl WebServer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", self.config.bind_addr, e))?;

        // 初始化数据库
        let pool = init_sqlite_pool(&self.config.database_url).await?;
        init_db(&self.config.init_sql_path).await?;
        info!(database = %self.config.database_url, "Database initialized");

        // API Key 加密密钥
        match self.config.secret_key.as_deref() {
            Some(secret) => {
                init_encryption_key(secret);
            }
            None => warn!("LLM_ADMIN_SECRET not set, API keys are encrypted with the development secret"),
        }

        // 缓存 + 预加载 provider 配置
        init_global_cache(&pool, self.config.cache_ttl_seconds, self.config.cache_max_capacity).await?;

        let purged = delete_expired_sessions(&pool).await?;
        if purged > 0 {
            info!(purged, "Expired sessions removed");
        }

        let catalog = RemoteCatalogClient::new(Duration::from_secs(self.config.remote_fetch_timeout_seconds))?;
        let state = AppState::new((*pool).clone(), self.config, catalog);
        let app = create_router(state);

        info!(%addr, "LLM admin API listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// 构建完整路由，测试中可直接使用
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // Provider管理
        .route("/providers", get(list_providers))
        .route("/providers/settings", get(list_provider_settings))
        .route("/providers/active", get(list_active_providers))
        .route("/providers/custom", post(add_custom_provider))
        .route("/providers/order", put(save_provider_order))
        .route("/providers/:id", get(get_provider).put(save_provider).delete(delete_custom_provider))
        .route("/providers/:id/remote-models", get(list_remote_models))
        // Provider下的模型
        .route("/providers/:id/models/order", put(save_models_order))
        .route("/providers/:id/models/:name", put(update_custom_model))
        .route("/providers/:id/models/:name/selected", put(set_provider_model_selected))
        .route("/providers/:id/models/:name/edit-form", get(get_edit_model_form).post(submit_edit_model_form))
        // Model管理
        .route("/models", get(list_models).post(add_custom_model))
        .route("/models/visible", get(list_visible_models))
        .route("/models/selected", put(set_model_selected))
        .route("/models/:name", axum::routing::delete(delete_custom_model));

    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        )
        .with_state(state)
}
