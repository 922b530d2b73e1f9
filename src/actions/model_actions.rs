use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::actions::{ActionOutcome, Session, require_admin};
use crate::dao::group::{GROUP_MODE_ALL, get_group_by_id, get_user_by_id, list_group_model_ids};
use crate::dao::model::{
    self, LlmModelView, MODEL_TYPE_CUSTOM, MODEL_TYPE_DEFAULT, ModelOrder, NewModel,
    cache_provider_models, get_provider_models_from_cache, invalidate_provider_models,
};
use crate::dao::provider::provider_exists;
use crate::error::{AdminError, AdminResult};

/// Order given to models created by toggling selection on a remote model.
pub const DEFAULT_SELECTED_MODEL_ORDER: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProviderRef {
    pub id: String,
    pub provider_name: String,
}

/// A model as the admin UI knows it: `id` is the model name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRef {
    pub id: String,
    pub display_name: String,
    pub provider: ModelProviderRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomModelInput {
    pub name: String,
    pub display_name: String,
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub support_vision: bool,
    #[serde(default)]
    pub support_tool: bool,
    #[serde(default = "default_selected")]
    pub selected: bool,
    /// Taken from the path on update routes.
    #[serde(default)]
    pub provider_id: String,
    pub provider_name: String,
}

fn default_selected() -> bool {
    true
}

impl CustomModelInput {
    fn validate(&self) -> AdminResult<()> {
        if self.name.trim().is_empty() || self.provider_id.trim().is_empty() {
            return Err(AdminError::BadRequest {
                message: "model name and provider id are required".to_string(),
            });
        }
        if self.display_name.trim().is_empty() {
            return Err(AdminError::BadRequest { message: "display name is required".to_string() });
        }
        Ok(())
    }

    fn to_new_model(&self) -> NewModel {
        NewModel {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            max_tokens: self.max_tokens,
            support_vision: self.support_vision,
            support_tool: self.support_tool,
            selected: self.selected,
            provider_id: self.provider_id.clone(),
            provider_name: self.provider_name.clone(),
            model_type: MODEL_TYPE_CUSTOM.to_string(),
            sort_order: None,
        }
    }
}

/// Which model ids a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelVisibility {
    All,
    Only(HashSet<i64>),
}

impl ModelVisibility {
    pub fn allows(&self, model_id: i64) -> bool {
        match self {
            ModelVisibility::All => true,
            ModelVisibility::Only(ids) => ids.contains(&model_id),
        }
    }
}

/// Derive the caller's visibility: everything when the user has no group or an
/// `all` group, otherwise the group's explicit links. No session sees nothing.
pub async fn resolve_visibility(pool: &SqlitePool, session: Option<&Session>) -> AdminResult<ModelVisibility> {
    let Some(session) = session else {
        return Ok(ModelVisibility::Only(HashSet::new()));
    };

    let group_id = get_user_by_id(pool, &session.user_id)
        .await?
        .and_then(|user| user.group_id);
    let Some(group_id) = group_id else {
        return Ok(ModelVisibility::All);
    };

    match get_group_by_id(pool, &group_id).await? {
        Some(group) if group.model_type == GROUP_MODE_ALL => Ok(ModelVisibility::All),
        _ => {
            let ids = list_group_model_ids(pool, &group_id).await?;
            Ok(ModelVisibility::Only(ids.into_iter().collect()))
        }
    }
}

/// Models joined with provider logo and api style. A single provider's list is
/// served from the model-list cache when present.
pub async fn list_models(pool: &SqlitePool, provider_id: Option<&str>) -> AdminResult<Vec<LlmModelView>> {
    let Some(provider_id) = provider_id else {
        return Ok(model::list_model_views(pool, None).await?);
    };

    if let Some(models) = get_provider_models_from_cache(provider_id).await {
        debug!(provider = %provider_id, "Model list cache hit");
        return Ok(models);
    }
    refresh_provider_models_cache(pool, provider_id).await
}

/// Reload one provider's model list from the database and cache it.
pub async fn refresh_provider_models_cache(pool: &SqlitePool, provider_id: &str) -> AdminResult<Vec<LlmModelView>> {
    let models = model::list_model_views(pool, Some(provider_id)).await?;
    if let Err(e) = cache_provider_models(provider_id, &models).await {
        error!(provider = %provider_id, error = %e, "Failed to cache model list");
    }
    Ok(models)
}

/// Selected models of active providers. With `require_auth` the list is narrowed
/// to what the caller's group grants; without it nothing is filtered.
pub async fn list_visible_models(
    pool: &SqlitePool,
    session: Option<&Session>,
    require_auth: bool,
) -> AdminResult<Vec<LlmModelView>> {
    let visibility = if require_auth {
        resolve_visibility(pool, session).await?
    } else {
        ModelVisibility::All
    };

    let models = model::list_visible_model_views(pool)
        .await?
        .into_iter()
        .filter(|m| visibility.allows(m.id))
        .collect();
    Ok(models)
}

async fn invalidate_providers(providers: &[String]) {
    for provider_id in providers {
        invalidate_provider_models(provider_id).await;
    }
}

/// Toggle `selected` by model name alone. Touches every provider that has a
/// model with this name. Returns the number of rows updated.
pub async fn set_model_selected(
    pool: &SqlitePool,
    session: Option<&Session>,
    name: &str,
    selected: bool,
) -> AdminResult<u64> {
    let admin = require_admin(session)?;
    let rows = model::update_selected_by_name(pool, name, selected).await?;
    let providers = model::list_provider_ids_for_model_name(pool, name).await?;
    invalidate_providers(&providers).await;
    if providers.len() > 1 {
        warn!(model = %name, providers = ?providers, "Selection changed under several providers");
    }

    info!(model = %name, selected, rows, user_id = %admin.user_id, "Model selection changed");
    Ok(rows)
}

/// Upsert on (provider, name): update `selected`, or insert a default model.
pub async fn set_model_selected_for_provider(
    pool: &SqlitePool,
    session: Option<&Session>,
    model_ref: &ModelRef,
    selected: bool,
) -> AdminResult<()> {
    let admin = require_admin(session)?;
    let provider_id = &model_ref.provider.id;

    match model::get_model_by_provider_and_name(pool, provider_id, &model_ref.id).await? {
        Some(_) => {
            model::update_selected_for_provider(pool, provider_id, &model_ref.id, selected).await?;
        }
        None => {
            let new_model = NewModel {
                name: model_ref.id.clone(),
                display_name: model_ref.display_name.clone(),
                max_tokens: None,
                support_vision: false,
                support_tool: false,
                selected,
                provider_id: provider_id.clone(),
                provider_name: model_ref.provider.provider_name.clone(),
                model_type: MODEL_TYPE_DEFAULT.to_string(),
                sort_order: Some(DEFAULT_SELECTED_MODEL_ORDER),
            };
            model::create_model(pool, &new_model).await?;
        }
    }
    invalidate_provider_models(provider_id).await;

    info!(provider = %provider_id, model = %model_ref.id, selected, user_id = %admin.user_id, "Model selection saved");
    Ok(())
}

/// Unconditional delete by name, across providers. Returns rows deleted.
pub async fn delete_custom_model(pool: &SqlitePool, session: Option<&Session>, name: &str) -> AdminResult<u64> {
    let admin = require_admin(session)?;
    // ids must be read before the rows are gone; invalidate only after the delete
    let providers = model::list_provider_ids_for_model_name(pool, name).await?;
    let rows = model::delete_models_by_name(pool, name).await?;
    invalidate_providers(&providers).await;
    if providers.len() > 1 {
        warn!(model = %name, providers = ?providers, "Deleted models under several providers");
    }

    info!(model = %name, rows, user_id = %admin.user_id, "Model deleted");
    Ok(rows)
}

pub async fn add_custom_model(
    pool: &SqlitePool,
    session: Option<&Session>,
    input: CustomModelInput,
) -> AdminResult<ActionOutcome> {
    let admin = require_admin(session)?;
    input.validate()?;

    if !provider_exists(pool, &input.provider_id).await? {
        return Ok(ActionOutcome::fail("the provider does not exist"));
    }
    if model::get_model_by_provider_and_name(pool, &input.provider_id, &input.name).await?.is_some() {
        return Ok(ActionOutcome::fail("a model with the same name already exists"));
    }

    model::create_model(pool, &input.to_new_model()).await?;
    invalidate_provider_models(&input.provider_id).await;

    info!(provider = %input.provider_id, model = %input.name, user_id = %admin.user_id, "Custom model added");
    Ok(ActionOutcome::Success)
}

/// Overwrite (provider, old_name) with `input`, renaming when the names differ.
pub async fn update_custom_model(
    pool: &SqlitePool,
    session: Option<&Session>,
    old_name: &str,
    input: CustomModelInput,
) -> AdminResult<ActionOutcome> {
    let admin = require_admin(session)?;
    input.validate()?;

    if model::get_model_by_provider_and_name(pool, &input.provider_id, old_name).await?.is_none() {
        return Ok(ActionOutcome::fail("the model has been deleted"));
    }
    if input.name != old_name
        && model::get_model_by_provider_and_name(pool, &input.provider_id, &input.name).await?.is_some()
    {
        return Ok(ActionOutcome::fail("a model with the same name already exists"));
    }

    model::update_model_by_provider_and_name(pool, &input.provider_id, old_name, &input.to_new_model()).await?;
    invalidate_provider_models(&input.provider_id).await;

    info!(
        provider = %input.provider_id,
        old_name = %old_name,
        new_name = %input.name,
        user_id = %admin.user_id,
        "Custom model updated"
    );
    Ok(ActionOutcome::Success)
}

/// Reorder one provider's models atomically. Returns rows updated.
pub async fn save_models_order(
    pool: &SqlitePool,
    session: Option<&Session>,
    provider_id: &str,
    orders: &[ModelOrder],
) -> AdminResult<u64> {
    let admin = require_admin(session)?;
    let updated = model::save_model_orders(pool, provider_id, orders).await?;
    invalidate_provider_models(provider_id).await;

    info!(provider = %provider_id, entries = orders.len(), updated, user_id = %admin.user_id, "Model order saved");
    Ok(updated)
}
