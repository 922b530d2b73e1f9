//! # Web管理接口模块
//!
//! 提供 LLM Provider 和模型管理的 HTTP JSON 接口

pub mod server;
pub mod state;
pub mod handlers;
pub mod dto;
pub mod middleware;

pub use server::{WebServer, create_router};
pub use state::AppState;
