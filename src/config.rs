//! # 运行配置
//!
//! 所有配置项从环境变量读取，缺省时使用默认值

use std::str::FromStr;
use tracing::warn;

use crate::logger::{LogConfig, LogLevel};

/// 服务配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 数据库连接串
    pub database_url: String,
    /// 初始化 SQL 脚本路径
    pub init_sql_path: String,
    /// 监听地址
    pub bind_addr: String,
    /// API Key 加密密钥，未配置时使用开发密钥
    pub secret_key: Option<String>,
    /// 会话 cookie 名称
    pub session_cookie_name: String,
    /// 会话有效期（秒）
    pub session_ttl_seconds: i64,
    /// 拉取远端模型列表的超时（秒）
    pub remote_fetch_timeout_seconds: u64,
    /// 缓存 TTL（秒）
    pub cache_ttl_seconds: u64,
    /// 缓存最大条目数
    pub cache_max_capacity: u64,
    /// 允许的 CORS 来源，为空表示任意来源
    pub cors_allowed_origins: Vec<String>,
    /// 日志配置
    pub log: LogConfig,
    /// 无法解析、已回退默认值的配置项 (key, value)
    pub rejected: Vec<(String, String)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/app.db?mode=rwc".to_string(),
            init_sql_path: "data/init.sql".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
            secret_key: None,
            session_cookie_name: "session_token".to_string(),
            session_ttl_seconds: 86400,
            remote_fetch_timeout_seconds: 30,
            cache_ttl_seconds: 3600,
            cache_max_capacity: 1000,
            cors_allowed_origins: Vec::new(),
            log: LogConfig::default(),
            rejected: Vec::new(),
        }
    }
}

impl AppConfig {
    /// 从进程环境变量构建配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数构建配置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut rejected = Vec::new();
        let mut parse = |key: &str, default| match lookup(key) {
            Some(raw) => parse_or(&raw, key, default, &mut rejected),
            None => default,
        };

        let session_ttl_seconds = parse("SESSION_TTL_SECONDS", defaults.session_ttl_seconds as u64) as i64;
        let remote_fetch_timeout_seconds = parse("REMOTE_FETCH_TIMEOUT_SECONDS", defaults.remote_fetch_timeout_seconds);
        let cache_ttl_seconds = parse("CACHE_TTL_SECONDS", defaults.cache_ttl_seconds);
        let cache_max_capacity = parse("CACHE_MAX_CAPACITY", defaults.cache_max_capacity);

        let mut log = defaults.log.clone();
        if let Some(level) = lookup("LOG_LEVEL") {
            log.level = parse_or(&level, "LOG_LEVEL", log.level, &mut rejected);
        }
        if let Some(dir) = lookup("LOG_DIR") {
            log.log_dir = dir;
        }
        if let Some(json) = lookup("LOG_JSON") {
            log.json_format = parse_or(&json, "LOG_JSON", log.json_format, &mut rejected);
        }

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            init_sql_path: lookup("INIT_SQL_PATH").unwrap_or(defaults.init_sql_path),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            secret_key: lookup("LLM_ADMIN_SECRET").filter(|s| !s.is_empty()),
            session_cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie_name),
            session_ttl_seconds,
            remote_fetch_timeout_seconds,
            cache_ttl_seconds,
            cache_max_capacity,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log,
            rejected,
        }
    }

    /// 日志初始化之后调用，输出被忽略的配置项
    pub fn log_rejected(&self) {
        for (key, value) in &self.rejected {
            warn!(key = %key, value = %value, "Invalid config value, using default");
        }
    }
}

fn parse_or<T: FromStr>(raw: &str, key: &str, default: T, rejected: &mut Vec<(String, String)>) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            rejected.push((key.to_string(), raw.to_string()));
            default
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}
