//! # LLM 管理后台启动程序

use llm_admin::{config::AppConfig, logger, web::WebServer};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    // 初始化日志，guard 需要一直持有
    let _guard = match logger::init_logger(config.log.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
            std::process::exit(1);
        }
    };
    config.log_rejected();
    info!(
        database = %config.database_url,
        init_sql = %config.init_sql_path,
        bind = %config.bind_addr,
        "Starting LLM admin"
    );

    if let Err(e) = WebServer::new(config).start().await {
        error!("Server stopped with error: {:#}", e);
        std::process::exit(1);
    }
}
