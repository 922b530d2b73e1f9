//! # 会话提取
//!
//! 从 `Authorization: Bearer <token>` 或会话 cookie 中读取 token，
//! 查询 sessions 表得到当前用户。没有有效会话时得到 `None`，
//! 是否放行由各个操作自己的管理员校验决定。

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::actions::Session;
use crate::dao::session::get_session_user;
use crate::error::AdminError;
use crate::web::state::AppState;

/// 当前请求的会话（可能为空）
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn as_ref(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| cookie_token(parts, &state.config.session_cookie_name));
        let Some(token) = token else {
            return Ok(CurrentSession(None));
        };

        let user = get_session_user(&state.pool, token).await?;
        if user.is_none() {
            debug!("Session token not found or expired");
        }
        Ok(CurrentSession(user.map(Session::from)))
    }
}
