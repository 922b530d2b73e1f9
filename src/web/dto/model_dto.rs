use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListModelsQuery {
    pub provider_id: Option<String>,
}

/// 按模型名称切换可见性（跨 provider）
#[derive(Debug, Serialize, Deserialize)]
pub struct SetSelectedRequest {
    pub name: String,
    pub selected: bool,
}

/// 按 (provider, name) 切换可见性，不存在时新建
#[derive(Debug, Serialize, Deserialize)]
pub struct SetProviderModelSelectedRequest {
    pub display_name: Option<String>,
    pub provider_name: Option<String>,
    pub selected: bool,
}

/// 影响的行数
#[derive(Debug, Serialize, Deserialize)]
pub struct RowsAffectedResponse {
    pub rows: u64,
}
