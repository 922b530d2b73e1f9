use sqlx::SqlitePool;
use std::sync::Arc;

use crate::actions::remote_models::RemoteCatalogClient;
use crate::config::AppConfig;

/// 所有 handler 共享的状态
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub catalog: RemoteCatalogClient,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig, catalog: RemoteCatalogClient) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            catalog,
        }
    }
}
