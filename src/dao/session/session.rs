use sqlx::{SqlitePool, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user behind a live session token.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: String,
    pub is_admin: bool,
}

/// Issue a new token for `user_id`, valid for `ttl_seconds`
pub async fn create_session(pool: &SqlitePool, user_id: &str, ttl_seconds: i64) -> Result<String> {
    let token = Uuid::new_v4().to_string();
    sqlx::query(r#"
        INSERT INTO sessions (token, user_id, expires_at, created_at)
        VALUES (?, ?, datetime('now', '+' || ? || ' seconds'), datetime('now'))
    "#)
        .bind(&token)
        .bind(user_id)
        .bind(ttl_seconds)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Resolve a token; expired tokens and tokens of deleted users resolve to `None`
pub async fn get_session_user(pool: &SqlitePool, token: &str) -> Result<Option<SessionUser>> {
    let user = sqlx::query_as::<_, SessionUser>(r#"
        SELECT u.id AS user_id, u.is_admin AS is_admin
        FROM sessions s
        INNER JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > datetime('now')
    "#)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
