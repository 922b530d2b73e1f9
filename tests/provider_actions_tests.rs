use llm_admin::actions::provider_actions::{
    add_custom_provider, delete_custom_provider, get_provider_by_id, list_active_providers,
    list_all_provider_settings, list_providers, save_provider, save_provider_order,
    CustomProviderInput, ProviderFormValues, PROVIDER_TYPE_CUSTOM,
};
use llm_admin::actions::{ActionOutcome, ApiStyle, Session};
use llm_admin::dao::provider::{self, ProviderOrder};
use llm_admin::dao::{open_memory_pool, run_init_script};
use llm_admin::error::AdminError;
use sqlx::SqlitePool;

/// 初始化测试环境的辅助函数
async fn setup_test_env() -> SqlitePool {
    let pool = open_memory_pool().await.expect("open pool failed");
    run_init_script(&pool, include_str!("../data/init.sql"))
        .await
        .expect("DB init failed");
    pool
}

fn admin() -> Session {
    Session { user_id: "admin".to_string(), is_admin: true }
}

fn member() -> Session {
    Session { user_id: "member".to_string(), is_admin: false }
}

fn form(name: &str, active: bool, key: &str, order: i64) -> ProviderFormValues {
    ProviderFormValues {
        is_active: Some(active),
        apikey: Some(key.to_string()),
        provider_name: Some(name.to_string()),
        endpoint: Some(format!("https://{}.example.com/v1", name.to_lowercase())),
        order: Some(order),
    }
}

#[tokio::test]
async fn test_save_provider_upserts_single_row() {
    let pool = setup_test_env().await;
    let admin = admin();

    save_provider(&pool, Some(&admin), "openai", form("OpenAI", true, "sk-1", 1))
        .await
        .expect("first save failed");
    save_provider(&pool, Some(&admin), "openai", form("OpenAI Renamed", false, "sk-2", 3))
        .await
        .expect("second save failed");

    let providers = list_providers(&pool).await.expect("list_providers failed");
    println!("✅ Providers after two saves: {}", providers.len());
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].provider_name, "OpenAI Renamed");
    assert!(!providers[0].is_active);
    assert_eq!(providers[0].sort_order, Some(3));

    let settings = list_all_provider_settings(&pool, Some(&admin))
        .await
        .expect("list_all_provider_settings failed");
    assert_eq!(settings[0].apikey.as_deref(), Some("sk-2"));
}

#[tokio::test]
async fn test_save_provider_partial_update_keeps_other_fields() {
    let pool = setup_test_env().await;
    let admin = admin();

    save_provider(&pool, Some(&admin), "openai", form("OpenAI", true, "sk-1", 2))
        .await
        .expect("save failed");
    let only_status = ProviderFormValues { is_active: Some(false), ..Default::default() };
    save_provider(&pool, Some(&admin), "openai", only_status)
        .await
        .expect("partial save failed");

    let settings = list_all_provider_settings(&pool, Some(&admin)).await.unwrap();
    assert_eq!(settings[0].provider_name, "OpenAI");
    assert_eq!(settings[0].apikey.as_deref(), Some("sk-1"));
    assert_eq!(settings[0].order, Some(2));
    assert!(!settings[0].is_active);
}

#[tokio::test]
async fn test_save_provider_defaults_name_to_untitled() {
    let pool = setup_test_env().await;
    save_provider(&pool, Some(&admin()), "nameless", ProviderFormValues::default())
        .await
        .expect("save failed");

    let stored = provider::get_provider_by_id(&pool, "nameless").await.unwrap().unwrap();
    assert_eq!(stored.provider_name, "Untitled");
    assert_eq!(stored.api_style, "openai");
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_api_key_is_encrypted_at_rest() {
    let pool = setup_test_env().await;
    save_provider(&pool, Some(&admin()), "openai", form("OpenAI", true, "sk-secret", 1))
        .await
        .unwrap();

    let stored = provider::get_provider_by_id(&pool, "openai").await.unwrap().unwrap();
    let raw = stored.apikey.expect("apikey stored");
    println!("✅ Stored key: {}", raw);
    assert_ne!(raw, "sk-secret");
    assert!(!raw.contains("sk-secret"));
}

#[tokio::test]
async fn test_mutations_require_admin() {
    let pool = setup_test_env().await;
    let member = member();

    let result = save_provider(&pool, Some(&member), "openai", form("OpenAI", true, "k", 1)).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
    let result = save_provider(&pool, None, "openai", form("OpenAI", true, "k", 1)).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));

    let result = delete_custom_provider(&pool, Some(&member), "openai").await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
    let result = list_all_provider_settings(&pool, Some(&member)).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
    let result = save_provider_order(&pool, None, &[]).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));

    assert!(list_providers(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_provider_by_id_missing_is_not_found() {
    let pool = setup_test_env().await;
    match get_provider_by_id(&pool, Some(&admin()), "ghost").await {
        Err(AdminError::NotFound { resource, id }) => {
            assert_eq!(resource, "Provider");
            assert_eq!(id, "ghost");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_provider_by_id_returns_view() {
    let pool = setup_test_env().await;
    save_provider(&pool, Some(&admin()), "openai", form("OpenAI", true, "k", 1)).await.unwrap();

    let view = get_provider_by_id(&pool, Some(&admin()), "openai").await.expect("get failed");
    assert_eq!(view.id, "openai");
    assert_eq!(view.provider_name, "OpenAI");
    assert!(view.status);
    assert_eq!(view.provider_type, "default");
}

#[tokio::test]
async fn test_add_custom_provider_and_duplicate() {
    let pool = setup_test_env().await;
    let admin = admin();
    let input = CustomProviderInput {
        provider: "my-llm".to_string(),
        provider_name: "My LLM".to_string(),
        endpoint: "http://localhost:9000/v1".to_string(),
        api_style: ApiStyle::Claude,
        apikey: "key-1".to_string(),
    };

    let outcome = add_custom_provider(&pool, Some(&admin), input.clone()).await.expect("add failed");
    assert_eq!(outcome, ActionOutcome::Success);

    let outcome = add_custom_provider(&pool, Some(&admin), input).await.expect("second add failed");
    println!("✅ Duplicate add: {:?}", outcome);
    assert!(!outcome.is_success());

    let settings = list_all_provider_settings(&pool, Some(&admin)).await.unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0].provider_type, PROVIDER_TYPE_CUSTOM);
    assert_eq!(settings[0].api_style, "claude");
    assert!(settings[0].is_active);
    assert_eq!(settings[0].apikey.as_deref(), Some("key-1"));
}

#[tokio::test]
async fn test_delete_missing_provider_still_succeeds() {
    let pool = setup_test_env().await;
    let outcome = delete_custom_provider(&pool, Some(&admin()), "ghost").await.expect("delete failed");
    assert_eq!(outcome, ActionOutcome::Success);
}

#[tokio::test]
async fn test_active_providers_and_ordering() {
    let pool = setup_test_env().await;
    let admin = admin();
    save_provider(&pool, Some(&admin), "a", form("A", true, "k", 3)).await.unwrap();
    save_provider(&pool, Some(&admin), "b", form("B", false, "k", 1)).await.unwrap();
    save_provider(&pool, Some(&admin), "c", form("C", true, "k", 2)).await.unwrap();

    let active = list_active_providers(&pool).await.unwrap();
    let ids: Vec<_> = active.iter().map(|p| p.provider.as_str()).collect();
    assert_eq!(ids, vec!["c", "a"]);

    let orders = vec![
        ProviderOrder { provider_id: "a".to_string(), order: 1 },
        ProviderOrder { provider_id: "b".to_string(), order: 2 },
        ProviderOrder { provider_id: "c".to_string(), order: 3 },
    ];
    let updated = save_provider_order(&pool, Some(&admin), &orders).await.expect("reorder failed");
    assert_eq!(updated, 3);

    let all = list_providers(&pool).await.unwrap();
    let ids: Vec<_> = all.iter().map(|p| p.provider.as_str()).collect();
    println!("✅ Order after save: {:?}", ids);
    assert_eq!(ids, vec!["a", "b", "c"]);
}
