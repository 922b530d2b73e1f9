use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::actions::{ActionOutcome, ApiStyle, Session, require_admin};
use crate::dao::crypto::{decrypt_optional, encrypt_api_key, encrypt_optional};
use crate::dao::model::invalidate_provider_models;
use crate::dao::provider::{
    self, LlmSetting, NewProvider, ProviderFields, ProviderOrder, ProviderSummary,
    invalidate_llm_config,
};
use crate::error::{AdminError, AdminResult};

pub const PROVIDER_TYPE_DEFAULT: &str = "default";
pub const PROVIDER_TYPE_CUSTOM: &str = "custom";
const UNTITLED_PROVIDER: &str = "Untitled";

/// Fields an admin may change on a provider. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderFormValues {
    pub is_active: Option<bool>,
    pub apikey: Option<String>,
    pub provider_name: Option<String>,
    pub endpoint: Option<String>,
    pub order: Option<i64>,
}

/// Full provider settings with the API key decrypted. Admin only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub provider: String,
    pub provider_name: String,
    pub api_style: String,
    pub endpoint: Option<String>,
    pub apikey: Option<String>,
    pub is_active: bool,
    pub logo: Option<String>,
    pub order: Option<i64>,
    pub provider_type: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ProviderSettings {
    fn from_setting(setting: LlmSetting) -> AdminResult<Self> {
        let apikey = decrypt_optional(setting.apikey.as_deref()).map_err(AdminError::crypto)?;
        Ok(Self {
            provider: setting.provider,
            provider_name: setting.provider_name,
            api_style: setting.api_style,
            endpoint: setting.endpoint,
            apikey,
            is_active: setting.is_active,
            logo: setting.logo,
            order: setting.sort_order,
            provider_type: setting.provider_type,
            created_at: setting.created_at,
            updated_at: setting.updated_at,
        })
    }
}

/// Provider as shown on its admin detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderView {
    pub id: String,
    pub provider_name: String,
    pub api_style: String,
    pub provider_logo: Option<String>,
    pub status: bool,
    pub provider_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomProviderInput {
    pub provider: String,
    pub provider_name: String,
    pub endpoint: String,
    pub api_style: ApiStyle,
    pub apikey: String,
}

/// Upsert: update the given fields when the provider exists, otherwise insert it.
pub async fn save_provider(
    pool: &SqlitePool,
    session: Option<&Session>,
    provider_id: &str,
    values: ProviderFormValues,
) -> AdminResult<()> {
    let admin = require_admin(session)?;
    if provider_id.trim().is_empty() {
        return Err(AdminError::BadRequest { message: "provider id is required".to_string() });
    }

    let apikey = encrypt_optional(values.apikey.as_deref()).map_err(AdminError::crypto)?;

    if provider::provider_exists(pool, provider_id).await? {
        let fields = ProviderFields {
            is_active: values.is_active,
            apikey,
            provider_name: values.provider_name,
            endpoint: values.endpoint,
            sort_order: values.order,
        };
        provider::update_provider_fields(pool, provider_id, &fields).await?;
        info!(provider = %provider_id, user_id = %admin.user_id, "Provider updated");
    } else {
        let new_provider = NewProvider {
            provider: provider_id.to_string(),
            provider_name: values
                .provider_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNTITLED_PROVIDER.to_string()),
            api_style: ApiStyle::Openai.as_str().to_string(),
            endpoint: values.endpoint,
            apikey,
            is_active: values.is_active.unwrap_or(false),
            logo: None,
            sort_order: values.order,
            provider_type: PROVIDER_TYPE_DEFAULT.to_string(),
        };
        provider::create_provider(pool, &new_provider).await?;
        info!(provider = %provider_id, user_id = %admin.user_id, "Provider created");
    }

    invalidate_llm_config(provider_id).await;
    Ok(())
}

/// Providers without credentials, open to any caller
pub async fn list_providers(pool: &SqlitePool) -> AdminResult<Vec<ProviderSummary>> {
    Ok(provider::list_provider_summaries(pool).await?)
}

/// Every provider with its decrypted key, ordered by display order
pub async fn list_all_provider_settings(
    pool: &SqlitePool,
    session: Option<&Session>,
) -> AdminResult<Vec<ProviderSettings>> {
    require_admin(session)?;
    provider::list_provider_settings(pool)
        .await?
        .into_iter()
        .map(ProviderSettings::from_setting)
        .collect()
}

pub async fn get_provider_by_id(
    pool: &SqlitePool,
    session: Option<&Session>,
    provider_id: &str,
) -> AdminResult<ProviderView> {
    require_admin(session)?;
    let setting = provider::get_provider_by_id(pool, provider_id)
        .await?
        .ok_or_else(|| AdminError::not_found("Provider", provider_id))?;

    Ok(ProviderView {
        id: setting.provider,
        provider_name: setting.provider_name,
        api_style: setting.api_style,
        provider_logo: setting.logo,
        status: setting.is_active,
        provider_type: setting.provider_type,
    })
}

/// Active providers without credentials, open to any caller
pub async fn list_active_providers(pool: &SqlitePool) -> AdminResult<Vec<ProviderSummary>> {
    Ok(provider::list_active_provider_summaries(pool).await?)
}

pub async fn add_custom_provider(
    pool: &SqlitePool,
    session: Option<&Session>,
    input: CustomProviderInput,
) -> AdminResult<ActionOutcome> {
    let admin = require_admin(session)?;
    if input.provider.trim().is_empty() || input.provider_name.trim().is_empty() {
        return Err(AdminError::BadRequest {
            message: "provider id and provider name are required".to_string(),
        });
    }

    if provider::provider_exists(pool, &input.provider).await? {
        warn!(provider = %input.provider, "Custom provider already exists");
        return Ok(ActionOutcome::fail("a provider with the same id already exists"));
    }

    let apikey = encrypt_api_key(&input.apikey).map_err(AdminError::crypto)?;
    let new_provider = NewProvider {
        provider: input.provider.clone(),
        provider_name: input.provider_name,
        api_style: input.api_style.as_str().to_string(),
        endpoint: Some(input.endpoint),
        apikey: Some(apikey),
        is_active: true,
        logo: None,
        sort_order: None,
        provider_type: PROVIDER_TYPE_CUSTOM.to_string(),
    };
    provider::create_provider(pool, &new_provider).await?;
    invalidate_llm_config(&input.provider).await;

    info!(provider = %input.provider, user_id = %admin.user_id, "Custom provider added");
    Ok(ActionOutcome::Success)
}

/// Unconditional delete; a missing id still succeeds
pub async fn delete_custom_provider(
    pool: &SqlitePool,
    session: Option<&Session>,
    provider_id: &str,
) -> AdminResult<ActionOutcome> {
    let admin = require_admin(session)?;
    let rows = provider::delete_provider(pool, provider_id).await?;
    invalidate_llm_config(provider_id).await;
    invalidate_provider_models(provider_id).await;

    info!(provider = %provider_id, rows, user_id = %admin.user_id, "Provider deleted");
    Ok(ActionOutcome::Success)
}

/// Reorder providers atomically. Returns the number of rows updated.
pub async fn save_provider_order(
    pool: &SqlitePool,
    session: Option<&Session>,
    orders: &[ProviderOrder],
) -> AdminResult<u64> {
    let admin = require_admin(session)?;
    let updated = provider::save_provider_orders(pool, orders).await?;

    info!(entries = orders.len(), updated, user_id = %admin.user_id, "Provider order saved");
    Ok(updated)
}
