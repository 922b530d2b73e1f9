//! # 管理操作错误类型
//!
//! 授权失败、资源不存在等"硬"错误走 `AdminError`；
//! 重名、目标已删除等冲突走 `ActionOutcome::Fail` 软返回。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum AdminError {
    /// 会话缺失或不是管理员
    NotAllowed,
    /// 资源不存在
    NotFound { resource: String, id: String },
    /// 请求参数不合法
    BadRequest { message: String },
    /// 数据库错误
    Database { source: sqlx::Error },
    /// API Key 加解密失败
    Crypto { message: String },
    /// 内部错误
    Internal { message: String },
}

pub type AdminResult<T> = Result<T, AdminError>;

impl std::fmt::Display for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminError::NotAllowed => write!(f, "not allowed"),
            AdminError::NotFound { resource, id } => write!(f, "{} with ID '{}' not found", resource, id),
            AdminError::BadRequest { message } => write!(f, "{}", message),
            AdminError::Database { source } => write!(f, "Database error: {}", source),
            AdminError::Crypto { message } => write!(f, "Crypto error: {}", message),
            AdminError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdminError::Database { source } => Some(source),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(error: sqlx::Error) -> Self {
        AdminError::Database { source: error }
    }
}

impl AdminError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        AdminError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn crypto(error: anyhow::Error) -> Self {
        AdminError::Crypto { message: error.to_string() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::NotAllowed => StatusCode::FORBIDDEN,
            AdminError::NotFound { .. } => StatusCode::NOT_FOUND,
            AdminError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AdminError::Database { .. } | AdminError::Crypto { .. } | AdminError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回给调用方的消息，不暴露内部细节
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Database { .. } | AdminError::Crypto { .. } | AdminError::Internal { .. } => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
