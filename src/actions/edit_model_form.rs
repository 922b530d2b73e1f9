//! Edit form for a custom model.
//!
//! Token capacity is shown in K (stored value / 1024) and converted back on
//! submit. Submission writes to the database first; the provider's cached
//! model list is refreshed only after the write reports success.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::actions::model_actions::{CustomModelInput, refresh_provider_models_cache, update_custom_model};
use crate::actions::provider_actions::ProviderView;
use crate::actions::{ActionOutcome, Session, require_admin};
use crate::dao::model::{LlmModel, LlmModelView, get_model_by_provider_and_name};
use crate::error::{AdminError, AdminResult};

pub const TOKENS_PER_K: f64 = 1024.0;
/// Shown when the stored model has no token capacity.
pub const DEFAULT_MAX_TOKENS_K: f64 = 32.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditModelForm {
    pub old_model_id: String,
    pub model_id: String,
    pub model_display_name: String,
    pub model_max_tokens: Option<f64>,
    #[serde(default)]
    pub model_vision_support: bool,
    #[serde(default)]
    pub model_tool_support: bool,
}

/// Result of a form submission. `models` carries the provider's refreshed list
/// when the write succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct EditModelResult {
    #[serde(flatten)]
    pub outcome: ActionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<LlmModelView>>,
}

impl EditModelForm {
    /// Initial field values for `model`.
    pub fn from_model(model: &LlmModel) -> Self {
        Self {
            old_model_id: model.name.clone(),
            model_id: model.name.clone(),
            model_display_name: model.display_name.clone(),
            model_max_tokens: Some(
                model
                    .max_tokens
                    .map(|tokens| tokens as f64 / TOKENS_PER_K)
                    .unwrap_or(DEFAULT_MAX_TOKENS_K),
            ),
            model_vision_support: model.support_vision.unwrap_or(false),
            model_tool_support: model.support_tool.unwrap_or(false),
        }
    }

    pub fn validate(&self) -> AdminResult<()> {
        let mut problems = Vec::new();
        if self.model_id.trim().is_empty() {
            problems.push("model id is required");
        }
        if self.model_display_name.trim().is_empty() {
            problems.push("model display name is required");
        }
        match self.model_max_tokens {
            None => problems.push("max tokens is required"),
            Some(k) if !k.is_finite() || k <= 0.0 => problems.push("max tokens must be positive"),
            Some(_) => {}
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AdminError::BadRequest { message: problems.join("; ") })
        }
    }

    /// Payload for the update, back in raw token units.
    pub fn into_custom_model(self, provider: &ProviderView) -> AdminResult<CustomModelInput> {
        self.validate()?;
        let max_tokens = self
            .model_max_tokens
            .map(|k| (k * TOKENS_PER_K).round() as i64);

        Ok(CustomModelInput {
            name: self.model_id,
            display_name: self.model_display_name,
            max_tokens,
            support_vision: self.model_vision_support,
            support_tool: self.model_tool_support,
            selected: true,
            provider_id: provider.id.clone(),
            provider_name: provider.provider_name.clone(),
        })
    }
}

/// Load the form's initial values for (provider, model name).
pub async fn load_edit_model_form(
    pool: &SqlitePool,
    session: Option<&Session>,
    provider_id: &str,
    model_name: &str,
) -> AdminResult<EditModelForm> {
    require_admin(session)?;
    let model = get_model_by_provider_and_name(pool, provider_id, model_name)
        .await?
        .ok_or_else(|| AdminError::not_found("Model", model_name))?;
    Ok(EditModelForm::from_model(&model))
}

/// Persist the form, then refresh the provider's cached model list.
pub async fn submit_edit_model_form(
    pool: &SqlitePool,
    session: Option<&Session>,
    provider: &ProviderView,
    form: EditModelForm,
) -> AdminResult<EditModelResult> {
    let old_model_id = form.old_model_id.clone();
    let input = form.into_custom_model(provider)?;

    let outcome = update_custom_model(pool, session, &old_model_id, input).await?;
    if !outcome.is_success() {
        return Ok(EditModelResult { outcome, models: None });
    }

    let models = refresh_provider_models_cache(pool, &provider.id).await?;
    info!(provider = %provider.id, model = %old_model_id, "Edit form saved");
    Ok(EditModelResult { outcome, models: Some(models) })
}
