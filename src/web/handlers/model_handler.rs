use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::actions::edit_model_form::{self, EditModelForm, EditModelResult};
use crate::actions::model_actions::{self, CustomModelInput, ModelProviderRef, ModelRef};
use crate::actions::provider_actions;
use crate::actions::ActionOutcome;
use crate::dao::model::{LlmModelView, ModelOrder};
use crate::dao::provider::get_provider_by_id;
use crate::error::AdminResult;
use crate::web::dto::model_dto::*;
use crate::web::dto::provider_dto::{MessageResponse, OrderUpdateResponse};
use crate::web::middleware::session::CurrentSession;
use crate::web::state::AppState;

/// 获取模型列表，可按provider过滤
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListModelsQuery>,
) -> AdminResult<Json<Vec<LlmModelView>>> {
    let models = model_actions::list_models(&state.pool, query.provider_id.as_deref()).await?;
    Ok(Json(models))
}

/// 获取当前用户可见的模型
pub async fn list_visible_models(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AdminResult<Json<Vec<LlmModelView>>> {
    let models = model_actions::list_visible_models(&state.pool, session.as_ref(), true).await?;
    Ok(Json(models))
}

/// 按名称切换模型可见性
pub async fn set_model_selected(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<SetSelectedRequest>,
) -> AdminResult<Json<RowsAffectedResponse>> {
    let rows = model_actions::set_model_selected(&state.pool, session.as_ref(), &request.name, request.selected).await?;
    Ok(Json(RowsAffectedResponse { rows }))
}

/// 按 (provider, name) 切换模型可见性，不存在则新建
pub async fn set_provider_model_selected(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((provider_id, name)): Path<(String, String)>,
    Json(request): Json<SetProviderModelSelectedRequest>,
) -> AdminResult<Json<MessageResponse>> {
    let provider_name = match request.provider_name {
        Some(provider_name) => provider_name,
        None => get_provider_by_id(&state.pool, &provider_id)
            .await?
            .map(|p| p.provider_name)
            .unwrap_or_else(|| provider_id.clone()),
    };
    let model_ref = ModelRef {
        display_name: request.display_name.unwrap_or_else(|| name.clone()),
        id: name,
        provider: ModelProviderRef {
            id: provider_id,
            provider_name,
        },
    };

    model_actions::set_model_selected_for_provider(&state.pool, session.as_ref(), &model_ref, request.selected).await?;
    Ok(Json(MessageResponse::new("Model selection saved")))
}

/// 添加自定义模型
pub async fn add_custom_model(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(input): Json<CustomModelInput>,
) -> AdminResult<Json<ActionOutcome>> {
    Ok(Json(model_actions::add_custom_model(&state.pool, session.as_ref(), input).await?))
}

/// 更新自定义模型，路径中的 name 为旧名称
pub async fn update_custom_model(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((provider_id, name)): Path<(String, String)>,
    Json(mut input): Json<CustomModelInput>,
) -> AdminResult<Json<ActionOutcome>> {
    input.provider_id = provider_id;
    Ok(Json(model_actions::update_custom_model(&state.pool, session.as_ref(), &name, input).await?))
}

/// 按名称删除模型
pub async fn delete_custom_model(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(name): Path<String>,
) -> AdminResult<Json<RowsAffectedResponse>> {
    let rows = model_actions::delete_custom_model(&state.pool, session.as_ref(), &name).await?;
    Ok(Json(RowsAffectedResponse { rows }))
}

/// 保存某个provider下的模型排序
pub async fn save_models_order(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(provider_id): Path<String>,
    Json(orders): Json<Vec<ModelOrder>>,
) -> AdminResult<Json<OrderUpdateResponse>> {
    let updated = model_actions::save_models_order(&state.pool, session.as_ref(), &provider_id, &orders).await?;
    Ok(Json(OrderUpdateResponse { updated }))
}

/// 编辑表单的初始值
pub async fn get_edit_model_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((provider_id, name)): Path<(String, String)>,
) -> AdminResult<Json<EditModelForm>> {
    let form = edit_model_form::load_edit_model_form(&state.pool, session.as_ref(), &provider_id, &name).await?;
    Ok(Json(form))
}

/// 提交编辑表单
pub async fn submit_edit_model_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((provider_id, name)): Path<(String, String)>,
    Json(mut form): Json<EditModelForm>,
) -> AdminResult<Json<EditModelResult>> {
    let provider = provider_actions::get_provider_by_id(&state.pool, session.as_ref(), &provider_id).await?;
    form.old_model_id = name;
    let result = edit_model_form::submit_edit_model_form(&state.pool, session.as_ref(), &provider, form).await?;
    Ok(Json(result))
}
