use sqlx::{SqlitePool, Result};
use serde::{Deserialize, Serialize};

/// Group grants every model.
pub const GROUP_MODE_ALL: &str = "all";
/// Group grants only the models linked in `group_models`.
pub const GROUP_MODE_SPECIFIC: &str = "specific";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub is_admin: bool,
    pub group_id: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub model_type: String,
    pub created_at: Option<String>,
}

/// Insert a user, or refresh name/admin flag/group if it already exists
pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    name: Option<&str>,
    is_admin: bool,
    group_id: Option<&str>,
) -> Result<u64> {
    let res = sqlx::query(r#"
        INSERT INTO users (id, name, is_admin, group_id, created_at)
        VALUES (?, ?, ?, ?, datetime('now'))
        ON CONFLICT(id) DO UPDATE SET name = excluded.name, is_admin = excluded.is_admin, group_id = excluded.group_id
    "#)
        .bind(id)
        .bind(name)
        .bind(is_admin)
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn get_user_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn set_user_group(pool: &SqlitePool, user_id: &str, group_id: Option<&str>) -> Result<u64> {
    let res = sqlx::query("UPDATE users SET group_id = ? WHERE id = ?")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn create_group(pool: &SqlitePool, id: &str, name: &str, model_type: &str) -> Result<u64> {
    let res = sqlx::query("INSERT INTO groups (id, name, model_type, created_at) VALUES (?, ?, ?, datetime('now'))")
        .bind(id)
        .bind(name)
        .bind(model_type)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn get_group_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Group>> {
    let group = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(group)
}

pub async fn add_group_model(pool: &SqlitePool, group_id: &str, model_id: i64) -> Result<u64> {
    let res = sqlx::query("INSERT OR IGNORE INTO group_models (group_id, model_id) VALUES (?, ?)")
        .bind(group_id)
        .bind(model_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_group_model_ids(pool: &SqlitePool, group_id: &str) -> Result<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT model_id FROM group_models WHERE group_id = ?")
        .bind(group_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}
