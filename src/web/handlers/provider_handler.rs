use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::actions::provider_actions::{
    self, CustomProviderInput, ProviderFormValues, ProviderSettings, ProviderView,
};
use crate::actions::remote_models::{RemoteModel, fetch_remote_model_catalog};
use crate::actions::ActionOutcome;
use crate::dao::provider::{ProviderOrder, ProviderSummary};
use crate::error::AdminResult;
use crate::web::dto::provider_dto::{MessageResponse, OrderUpdateResponse};
use crate::web::middleware::session::CurrentSession;
use crate::web::state::AppState;

/// 获取所有provider（不含 API Key）
pub async fn list_providers(State(state): State<AppState>) -> AdminResult<Json<Vec<ProviderSummary>>> {
    Ok(Json(provider_actions::list_providers(&state.pool).await?))
}

/// 获取所有provider的完整配置（含 API Key，仅管理员）
pub async fn list_provider_settings(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AdminResult<Json<Vec<ProviderSettings>>> {
    Ok(Json(provider_actions::list_all_provider_settings(&state.pool, session.as_ref()).await?))
}

/// 获取已启用的provider
pub async fn list_active_providers(State(state): State<AppState>) -> AdminResult<Json<Vec<ProviderSummary>>> {
    Ok(Json(provider_actions::list_active_providers(&state.pool).await?))
}

/// 获取单个provider
pub async fn get_provider(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> AdminResult<Json<ProviderView>> {
    Ok(Json(provider_actions::get_provider_by_id(&state.pool, session.as_ref(), &id).await?))
}

/// 保存provider（存在则更新，不存在则创建）
pub async fn save_provider(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
    Json(values): Json<ProviderFormValues>,
) -> AdminResult<Json<MessageResponse>> {
    provider_actions::save_provider(&state.pool, session.as_ref(), &id, values).await?;
    Ok(Json(MessageResponse::new("Provider saved successfully")))
}

/// 添加自定义provider
pub async fn add_custom_provider(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(input): Json<CustomProviderInput>,
) -> AdminResult<Json<ActionOutcome>> {
    Ok(Json(provider_actions::add_custom_provider(&state.pool, session.as_ref(), input).await?))
}

/// 删除provider
pub async fn delete_custom_provider(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> AdminResult<Json<ActionOutcome>> {
    Ok(Json(provider_actions::delete_custom_provider(&state.pool, session.as_ref(), &id).await?))
}

/// 保存provider排序
pub async fn save_provider_order(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(orders): Json<Vec<ProviderOrder>>,
) -> AdminResult<Json<OrderUpdateResponse>> {
    let updated = provider_actions::save_provider_order(&state.pool, session.as_ref(), &orders).await?;
    Ok(Json(OrderUpdateResponse { updated }))
}

/// 拉取provider远端模型列表，失败时返回空列表
pub async fn list_remote_models(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<RemoteModel>> {
    Json(fetch_remote_model_catalog(&state.pool, &state.catalog, &id).await)
}
