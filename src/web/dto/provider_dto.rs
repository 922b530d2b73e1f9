use serde::{Deserialize, Serialize};

/// 批量更新排序后的返回
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderUpdateResponse {
    pub updated: u64,
}

/// 普通成功返回
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}
