use sqlx::{SqlitePool, Result};
use serde::{Deserialize, Serialize};

/// A full `llm_settings` row. `apikey` holds the encrypted value.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LlmSetting {
    pub provider: String,
    pub provider_name: String,
    pub api_style: String,
    pub endpoint: Option<String>,
    pub apikey: Option<String>,
    pub is_active: bool,
    pub logo: Option<String>,
    pub sort_order: Option<i64>,
    pub provider_type: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Projection of a provider without credentials.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub provider: String,
    pub provider_name: String,
    pub is_active: bool,
    pub api_style: String,
    pub logo: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewProvider {
    pub provider: String,
    pub provider_name: String,
    pub api_style: String,
    pub endpoint: Option<String>,
    pub apikey: Option<String>,
    pub is_active: bool,
    pub logo: Option<String>,
    pub sort_order: Option<i64>,
    pub provider_type: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProviderFields {
    pub is_active: Option<bool>,
    pub apikey: Option<String>,
    pub provider_name: Option<String>,
    pub endpoint: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOrder {
    pub provider_id: String,
    pub order: i64,
}

// NULL orders sort after explicit ones.
const ORDER_CLAUSE: &str = "ORDER BY sort_order IS NULL, sort_order ASC, provider ASC";

/// Create a new provider
pub async fn create_provider(pool: &SqlitePool, provider: &NewProvider) -> Result<u64> {
    let res = sqlx::query(r#"
        INSERT INTO llm_settings (
            provider, provider_name, api_style, endpoint, apikey, is_active, logo, sort_order,
            provider_type, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))
    "#)
        .bind(&provider.provider)
        .bind(&provider.provider_name)
        .bind(&provider.api_style)
        .bind(&provider.endpoint)
        .bind(&provider.apikey)
        .bind(provider.is_active)
        .bind(&provider.logo)
        .bind(provider.sort_order)
        .bind(&provider.provider_type)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Get provider by id
pub async fn get_provider_by_id(pool: &SqlitePool, id: &str) -> Result<Option<LlmSetting>> {
    let provider = sqlx::query_as::<_, LlmSetting>("SELECT * FROM llm_settings WHERE provider = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(provider)
}

pub async fn provider_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM llm_settings WHERE provider = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count.0 > 0)
}

/// All provider rows including encrypted keys
pub async fn list_provider_settings(pool: &SqlitePool) -> Result<Vec<LlmSetting>> {
    let sql = format!("SELECT * FROM llm_settings {}", ORDER_CLAUSE);
    let providers = sqlx::query_as::<_, LlmSetting>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(providers)
}

pub async fn list_provider_summaries(pool: &SqlitePool) -> Result<Vec<ProviderSummary>> {
    let sql = format!(
        "SELECT provider, provider_name, is_active, api_style, logo, sort_order FROM llm_settings {}",
        ORDER_CLAUSE
    );
    let providers = sqlx::query_as::<_, ProviderSummary>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(providers)
}

pub async fn list_active_provider_summaries(pool: &SqlitePool) -> Result<Vec<ProviderSummary>> {
    let sql = format!(
        "SELECT provider, provider_name, is_active, api_style, logo, sort_order FROM llm_settings WHERE is_active = 1 {}",
        ORDER_CLAUSE
    );
    let providers = sqlx::query_as::<_, ProviderSummary>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(providers)
}

/// Update the given fields in place
pub async fn update_provider_fields(pool: &SqlitePool, id: &str, fields: &ProviderFields) -> Result<u64> {
    let res = sqlx::query(r#"
        UPDATE llm_settings SET
            is_active = COALESCE(?, is_active),
            apikey = COALESCE(?, apikey),
            provider_name = COALESCE(?, provider_name),
            endpoint = COALESCE(?, endpoint),
            sort_order = COALESCE(?, sort_order),
            updated_at = datetime('now')
        WHERE provider = ?
    "#)
        .bind(fields.is_active)
        .bind(&fields.apikey)
        .bind(&fields.provider_name)
        .bind(&fields.endpoint)
        .bind(fields.sort_order)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Hard delete, no cascade to models or group links
pub async fn delete_provider(pool: &SqlitePool, id: &str) -> Result<u64> {
    let res = sqlx::query("DELETE FROM llm_settings WHERE provider = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Apply every order update in one transaction; any failure rolls all of them back.
pub async fn save_provider_orders(pool: &SqlitePool, orders: &[ProviderOrder]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;
    for item in orders {
        let res = sqlx::query("UPDATE llm_settings SET sort_order = ?, updated_at = datetime('now') WHERE provider = ?")
            .bind(item.order)
            .bind(&item.provider_id)
            .execute(&mut *tx)
            .await?;
        updated += res.rows_affected();
    }
    tx.commit().await?;
    Ok(updated)
}
