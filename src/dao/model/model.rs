use sqlx::{SqlitePool, Result};
use serde::{Serialize, Deserialize};

pub const MODEL_TYPE_DEFAULT: &str = "default";
pub const MODEL_TYPE_CUSTOM: &str = "custom";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LlmModel {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub max_tokens: Option<i64>,
    pub support_vision: Option<bool>,
    pub support_tool: Option<bool>,
    pub selected: bool,
    pub provider_id: String,
    pub provider_name: String,
    pub model_type: String,
    pub sort_order: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A model joined with display fields of its provider.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct LlmModelView {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub max_tokens: Option<i64>,
    pub support_vision: Option<bool>,
    pub support_tool: Option<bool>,
    pub selected: bool,
    pub provider_id: String,
    pub provider_name: String,
    pub model_type: String,
    pub sort_order: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub provider_logo: Option<String>,
    pub api_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub name: String,
    pub display_name: String,
    pub max_tokens: Option<i64>,
    pub support_vision: bool,
    pub support_tool: bool,
    pub selected: bool,
    pub provider_id: String,
    pub provider_name: String,
    pub model_type: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOrder {
    pub model_id: String,
    pub order: i64,
}

const VIEW_COLUMNS: &str = r#"
    m.id, m.name, m.display_name, m.max_tokens, m.support_vision, m.support_tool, m.selected,
    m.provider_id, m.provider_name, m.model_type, m.sort_order, m.created_at, m.updated_at,
    s.logo AS provider_logo, s.api_style AS api_style
"#;

/// Create a new model
pub async fn create_model(pool: &SqlitePool, model: &NewModel) -> Result<u64> {
    let res = sqlx::query(r#"
        INSERT INTO models (
            name, display_name, max_tokens, support_vision, support_tool, selected,
            provider_id, provider_name, model_type, sort_order, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(?, 1), datetime('now'), datetime('now'))
    "#)
        .bind(&model.name)
        .bind(&model.display_name)
        .bind(model.max_tokens)
        .bind(model.support_vision)
        .bind(model.support_tool)
        .bind(model.selected)
        .bind(&model.provider_id)
        .bind(&model.provider_name)
        .bind(&model.model_type)
        .bind(model.sort_order)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn get_model_by_provider_and_name(pool: &SqlitePool, provider: &str, name: &str) -> Result<Option<LlmModel>> {
    let model = sqlx::query_as::<_, LlmModel>("SELECT * FROM models WHERE provider_id = ? AND name = ?")
        .bind(provider)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(model)
}

/// Models joined to their provider, optionally for one provider, by (order, created_at)
pub async fn list_model_views(pool: &SqlitePool, provider_id: Option<&str>) -> Result<Vec<LlmModelView>> {
    let models = match provider_id {
        Some(provider_id) => {
            let sql = format!(
                "SELECT {} FROM models m INNER JOIN llm_settings s ON m.provider_id = s.provider \
                 WHERE m.provider_id = ? ORDER BY m.sort_order ASC, m.created_at ASC, m.id ASC",
                VIEW_COLUMNS
            );
            sqlx::query_as::<_, LlmModelView>(&sql)
                .bind(provider_id)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM models m INNER JOIN llm_settings s ON m.provider_id = s.provider \
                 ORDER BY m.sort_order ASC, m.created_at ASC, m.id ASC",
                VIEW_COLUMNS
            );
            sqlx::query_as::<_, LlmModelView>(&sql)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(models)
}

/// Selected models of active providers, by (provider order, model order).
/// Provider name comes from the provider row, not the denormalized copy.
pub async fn list_visible_model_views(pool: &SqlitePool) -> Result<Vec<LlmModelView>> {
    let models = sqlx::query_as::<_, LlmModelView>(r#"
        SELECT
            m.id, m.name, m.display_name, m.max_tokens, m.support_vision, m.support_tool, m.selected,
            m.provider_id, s.provider_name AS provider_name, m.model_type, m.sort_order,
            m.created_at, m.updated_at, s.logo AS provider_logo, s.api_style AS api_style
        FROM llm_settings s
        INNER JOIN models m ON s.provider = m.provider_id
        WHERE s.is_active = 1 AND m.selected = 1
        ORDER BY s.sort_order IS NULL, s.sort_order ASC, m.sort_order ASC, m.id ASC
    "#)
        .fetch_all(pool)
        .await?;
    Ok(models)
}

/// Providers that own a model with this name
pub async fn list_provider_ids_for_model_name(pool: &SqlitePool, name: &str) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT provider_id FROM models WHERE name = ?")
        .bind(name)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Toggle `selected` on every model with this name, across providers
pub async fn update_selected_by_name(pool: &SqlitePool, name: &str, selected: bool) -> Result<u64> {
    let res = sqlx::query("UPDATE models SET selected = ?, updated_at = datetime('now') WHERE name = ?")
        .bind(selected)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_selected_for_provider(pool: &SqlitePool, provider: &str, name: &str, selected: bool) -> Result<u64> {
    let res = sqlx::query(
        "UPDATE models SET selected = ?, updated_at = datetime('now') WHERE provider_id = ? AND name = ?",
    )
        .bind(selected)
        .bind(provider)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Overwrite every field of (provider, old_name), including the name itself
pub async fn update_model_by_provider_and_name(
    pool: &SqlitePool,
    provider: &str,
    old_name: &str,
    model: &NewModel,
) -> Result<u64> {
    let res = sqlx::query(r#"
        UPDATE models SET
            name = ?,
            display_name = ?,
            max_tokens = ?,
            support_vision = ?,
            support_tool = ?,
            selected = ?,
            provider_id = ?,
            provider_name = ?,
            model_type = ?,
            sort_order = COALESCE(?, sort_order),
            updated_at = datetime('now')
        WHERE provider_id = ? AND name = ?
    "#)
        .bind(&model.name)
        .bind(&model.display_name)
        .bind(model.max_tokens)
        .bind(model.support_vision)
        .bind(model.support_tool)
        .bind(model.selected)
        .bind(&model.provider_id)
        .bind(&model.provider_name)
        .bind(&model.model_type)
        .bind(model.sort_order)
        .bind(provider)
        .bind(old_name)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Delete every model with this name, across providers
pub async fn delete_models_by_name(pool: &SqlitePool, name: &str) -> Result<u64> {
    let res = sqlx::query("DELETE FROM models WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Apply every order update for one provider in a single transaction
pub async fn save_model_orders(pool: &SqlitePool, provider: &str, orders: &[ModelOrder]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;
    for item in orders {
        let res = sqlx::query(
            "UPDATE models SET sort_order = ?, updated_at = datetime('now') WHERE provider_id = ? AND name = ?",
        )
            .bind(item.order)
            .bind(provider)
            .bind(&item.model_id)
            .execute(&mut *tx)
            .await?;
        updated += res.rows_affected();
    }
    tx.commit().await?;
    Ok(updated)
}
