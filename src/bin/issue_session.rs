//! # 签发会话 token
//!
//! 用户不存在时自动创建，打印的 token 可作为 `Authorization: Bearer <token>` 使用

use clap::Parser;
use llm_admin::{
    config::AppConfig,
    dao::{group::create_user, init_db, init_sqlite_pool, session::create_session},
    logger,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "issue_session")]
#[command(about = "Create or update a user and print a session token")]
struct Args {
    /// User id to issue the token for.
    user_id: String,

    /// Grant admin rights.
    #[arg(long)]
    admin: bool,

    /// Group that decides which models the user sees.
    #[arg(long)]
    group: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig::from_env();

    // 只写文件日志，stdout 留给 token
    let mut log_config = config.log.clone();
    log_config.console_output = false;
    let _guard = logger::init_logger(log_config)?;
    config.log_rejected();

    let pool = init_sqlite_pool(&config.database_url).await?;
    init_db(&config.init_sql_path).await?;

    create_user(&pool, &args.user_id, None, args.admin, args.group.as_deref()).await?;
    let token = create_session(&pool, &args.user_id, config.session_ttl_seconds).await?;
    info!(user_id = %args.user_id, is_admin = args.admin, "Session issued");

    println!("user:    {}", args.user_id);
    println!("admin:   {}", args.admin);
    println!("expires: in {} seconds", config.session_ttl_seconds);
    println!("{}", token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_with_group() {
        let args = Args::try_parse_from(["issue_session", "alice", "--admin", "--group", "g1"]).unwrap();
        assert_eq!(args.user_id, "alice");
        assert!(args.admin);
        assert_eq!(args.group.as_deref(), Some("g1"));
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["issue_session", "bob"]).unwrap();
        assert!(!args.admin);
        assert!(args.group.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Args::try_parse_from(["issue_session", "--admin"]).is_err());
        assert!(Args::try_parse_from(["issue_session", "a", "b"]).is_err());
        assert!(Args::try_parse_from(["issue_session", "a", "--group"]).is_err());
    }
}
