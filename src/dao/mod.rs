use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub static SQLITE_POOL: OnceCell<Arc<SqlitePool>> = OnceCell::new();

/// 异步初始化全局 SqlitePool
pub async fn init_sqlite_pool(db_url: &str) -> anyhow::Result<Arc<SqlitePool>> {
    let pool = SqlitePool::connect(db_url).await?;
    let pool = Arc::new(pool);
    SQLITE_POOL.set(pool.clone()).ok();
    Ok(SQLITE_POOL.get().cloned().unwrap_or(pool))
}

/// 单连接的内存数据库，测试和一次性工具使用
pub async fn open_memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

pub mod cache;

pub mod crypto;
pub mod group;
pub mod model;
pub mod provider;
pub mod session;

use tokio::fs;

/// 通过 SQLITE_POOL 获取数据库连接，并异步执行 SQL 脚本
pub async fn init_db(sql_path: &str) -> anyhow::Result<()> {
    let sql = fs::read_to_string(sql_path).await?;
    let pool = SQLITE_POOL
        .get()
        .ok_or_else(|| anyhow::anyhow!("SQLITE_POOL not initialized"))?
        .clone();
    run_init_script(&pool, &sql).await
}

/// 支持多条 SQL 语句分号分割执行
pub async fn run_init_script(pool: &SqlitePool, sql: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt).execute(pool).await?;
        }
    }
    Ok(())
}
