use llm_admin::actions::model_actions::{
    add_custom_model, delete_custom_model, list_models, list_visible_models, save_models_order,
    set_model_selected, set_model_selected_for_provider, update_custom_model, CustomModelInput,
    ModelProviderRef, ModelRef, DEFAULT_SELECTED_MODEL_ORDER,
};
use llm_admin::actions::{ActionOutcome, Session};
use llm_admin::dao::group::{add_group_model, create_group, create_user, GROUP_MODE_ALL, GROUP_MODE_SPECIFIC};
use llm_admin::dao::model::{get_model_by_provider_and_name, ModelOrder, MODEL_TYPE_DEFAULT};
use llm_admin::dao::provider::{create_provider, NewProvider};
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

async fn seed_provider(pool: &SqlitePool, id: &str, active: bool, order: Option<i64>) {
    let provider = NewProvider {
        provider: id.to_string(),
        provider_name: id.to_uppercase(),
        api_style: "openai".to_string(),
        endpoint: None,
        apikey: None,
        is_active: active,
        logo: Some(format!("/logos/{}.png", id)),
        sort_order: order,
        provider_type: "default".to_string(),
    };
    create_provider(pool, &provider).await.expect("create_provider failed");
}

fn model_input(provider_id: &str, name: &str) -> CustomModelInput {
    CustomModelInput {
        name: name.to_string(),
        display_name: format!("{} display", name),
        max_tokens: Some(8192),
        support_vision: false,
        support_tool: true,
        selected: true,
        provider_id: provider_id.to_string(),
        provider_name: provider_id.to_uppercase(),
    }
}

async fn model_id(pool: &SqlitePool, provider_id: &str, name: &str) -> i64 {
    get_model_by_provider_and_name(pool, provider_id, name)
        .await
        .expect("lookup failed")
        .expect("model exists")
        .id
}

#[tokio::test]
async fn test_add_custom_model_rejects_duplicate() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();

    let outcome = add_custom_model(&pool, Some(&admin), model_input("p1", "m1")).await.expect("add failed");
    assert_eq!(outcome, ActionOutcome::Success);

    let mut duplicate = model_input("p1", "m1");
    duplicate.display_name = "other".to_string();
    let outcome = add_custom_model(&pool, Some(&admin), duplicate).await.expect("second add failed");
    println!("✅ Duplicate add: {:?}", outcome);
    assert!(!outcome.is_success());

    let models = list_models(&pool, Some("p1")).await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].display_name, "m1 display");
    assert_eq!(models[0].provider_logo.as_deref(), Some("/logos/p1.png"));
}

#[tokio::test]
async fn test_same_name_allowed_under_different_providers() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    seed_provider(&pool, "p2", true, Some(2)).await;
    let admin = admin();

    assert!(add_custom_model(&pool, Some(&admin), model_input("p1", "shared")).await.unwrap().is_success());
    assert!(add_custom_model(&pool, Some(&admin), model_input("p2", "shared")).await.unwrap().is_success());
    assert_eq!(list_models(&pool, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_custom_model_unknown_provider_fails() {
    let pool = setup_test_env().await;
    let outcome = add_custom_model(&pool, Some(&admin()), model_input("ghost", "m1")).await.unwrap();
    assert!(!outcome.is_success());
    assert!(list_models(&pool, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_missing_model_fails_without_writing() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;

    let outcome = update_custom_model(&pool, Some(&admin()), "gone", model_input("p1", "gone"))
        .await
        .expect("update failed");
    assert!(matches!(outcome, ActionOutcome::Fail { .. }));
    assert!(list_models(&pool, Some("p1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_renames_and_rejects_conflicts() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("p1", "a")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p1", "b")).await.unwrap();

    // rename onto an existing name
    let outcome = update_custom_model(&pool, Some(&admin), "a", model_input("p1", "b")).await.unwrap();
    assert!(!outcome.is_success());

    let mut renamed = model_input("p1", "c");
    renamed.max_tokens = Some(4096);
    let outcome = update_custom_model(&pool, Some(&admin), "a", renamed).await.unwrap();
    assert!(outcome.is_success());

    assert!(get_model_by_provider_and_name(&pool, "p1", "a").await.unwrap().is_none());
    let stored = get_model_by_provider_and_name(&pool, "p1", "c").await.unwrap().expect("renamed model");
    assert_eq!(stored.max_tokens, Some(4096));
}

#[tokio::test]
async fn test_visible_models_skip_inactive_providers() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    seed_provider(&pool, "p2", false, Some(2)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("p1", "m1")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p2", "m2")).await.unwrap();

    let visible = list_visible_models(&pool, None, false).await.expect("list_visible_models failed");
    let names: Vec<_> = visible.iter().map(|m| m.name.as_str()).collect();
    println!("✅ Visible models: {:?}", names);
    assert_eq!(names, vec!["m1"]);
    assert_eq!(visible[0].provider_name, "P1");
}

#[tokio::test]
async fn test_visible_models_respect_groups() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("p1", "m1")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p1", "m2")).await.unwrap();
    let m1 = model_id(&pool, "p1", "m1").await;

    create_group(&pool, "limited", "Limited", GROUP_MODE_SPECIFIC).await.unwrap();
    add_group_model(&pool, "limited", m1).await.unwrap();
    create_group(&pool, "everyone", "Everyone", GROUP_MODE_ALL).await.unwrap();
    create_user(&pool, "u-limited", None, false, Some("limited")).await.unwrap();
    create_user(&pool, "u-all", None, false, Some("everyone")).await.unwrap();
    create_user(&pool, "u-free", None, false, None).await.unwrap();

    let session = |id: &str| Session { user_id: id.to_string(), is_admin: false };

    let limited = list_visible_models(&pool, Some(&session("u-limited")), true).await.unwrap();
    assert_eq!(limited.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["m1"]);

    let all = list_visible_models(&pool, Some(&session("u-all")), true).await.unwrap();
    assert_eq!(all.len(), 2);

    let free = list_visible_models(&pool, Some(&session("u-free")), true).await.unwrap();
    assert_eq!(free.len(), 2);

    let anonymous = list_visible_models(&pool, None, true).await.unwrap();
    assert!(anonymous.is_empty());
}

#[tokio::test]
async fn test_set_selected_for_provider_inserts_then_toggles() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();
    let model_ref = ModelRef {
        id: "remote-model".to_string(),
        display_name: "Remote Model".to_string(),
        provider: ModelProviderRef { id: "p1".to_string(), provider_name: "P1".to_string() },
    };

    set_model_selected_for_provider(&pool, Some(&admin), &model_ref, true).await.expect("insert failed");
    let stored = get_model_by_provider_and_name(&pool, "p1", "remote-model").await.unwrap().expect("inserted");
    assert!(stored.selected);
    assert_eq!(stored.sort_order, Some(DEFAULT_SELECTED_MODEL_ORDER));
    assert_eq!(stored.model_type, MODEL_TYPE_DEFAULT);

    set_model_selected_for_provider(&pool, Some(&admin), &model_ref, false).await.expect("toggle failed");
    let stored = get_model_by_provider_and_name(&pool, "p1", "remote-model").await.unwrap().unwrap();
    assert!(!stored.selected);
    assert_eq!(list_models(&pool, Some("p1")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_name_only_operations_touch_every_provider() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    seed_provider(&pool, "p2", true, Some(2)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("p1", "shared")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p2", "shared")).await.unwrap();

    let rows = set_model_selected(&pool, Some(&admin), "shared", false).await.expect("select failed");
    assert_eq!(rows, 2);
    assert!(list_visible_models(&pool, None, false).await.unwrap().is_empty());

    let rows = delete_custom_model(&pool, Some(&admin), "shared").await.expect("delete failed");
    assert_eq!(rows, 2);
    assert!(list_models(&pool, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_models_order() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();
    for name in ["a", "b", "c"] {
        add_custom_model(&pool, Some(&admin), model_input("p1", name)).await.unwrap();
    }

    let orders = vec![
        ModelOrder { model_id: "c".to_string(), order: 1 },
        ModelOrder { model_id: "a".to_string(), order: 2 },
        ModelOrder { model_id: "b".to_string(), order: 3 },
    ];
    let updated = save_models_order(&pool, Some(&admin), "p1", &orders).await.expect("reorder failed");
    assert_eq!(updated, 3);

    let names: Vec<_> = list_models(&pool, Some("p1"))
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_model_mutations_require_admin() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let member = Session { user_id: "m".to_string(), is_admin: false };

    let result = add_custom_model(&pool, Some(&member), model_input("p1", "m1")).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
    let result = delete_custom_model(&pool, None, "m1").await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
    let result = set_model_selected(&pool, Some(&member), "m1", true).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
    let result = save_models_order(&pool, None, "p1", &[]).await;
    assert!(matches!(result, Err(AdminError::NotAllowed)));
}

#[tokio::test]
async fn test_visible_models_ordered_by_provider_then_model() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p2", true, Some(2)).await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("p2", "p2-first")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p2", "p2-second")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p1", "p1-late")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p1", "p1-early")).await.unwrap();

    // 模型顺序与 provider 顺序相反，provider 顺序优先
    let p1_orders = vec![
        ModelOrder { model_id: "p1-late".to_string(), order: 9 },
        ModelOrder { model_id: "p1-early".to_string(), order: 5 },
    ];
    save_models_order(&pool, Some(&admin), "p1", &p1_orders).await.unwrap();
    let p2_orders = vec![
        ModelOrder { model_id: "p2-first".to_string(), order: 0 },
        ModelOrder { model_id: "p2-second".to_string(), order: 1 },
    ];
    save_models_order(&pool, Some(&admin), "p2", &p2_orders).await.unwrap();

    let names: Vec<_> = list_visible_models(&pool, None, false)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    println!("✅ Visible order: {:?}", names);
    assert_eq!(names, vec!["p1-early", "p1-late", "p2-first", "p2-second"]);
}

#[tokio::test]
async fn test_visible_models_unordered_provider_last() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "unordered", true, None).await;
    seed_provider(&pool, "ordered", true, Some(5)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("unordered", "u")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("ordered", "o")).await.unwrap();

    let names: Vec<_> = list_visible_models(&pool, None, false)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["o", "u"]);
}

#[tokio::test]
async fn test_list_models_ties_broken_by_created_at() {
    let pool = setup_test_env().await;
    seed_provider(&pool, "p1", true, Some(1)).await;
    let admin = admin();
    add_custom_model(&pool, Some(&admin), model_input("p1", "newer")).await.unwrap();
    add_custom_model(&pool, Some(&admin), model_input("p1", "older")).await.unwrap();

    // 同一排序值下，创建时间早的在前，与插入顺序无关
    sqlx::query("UPDATE models SET created_at = '2020-01-01 00:00:00' WHERE name = 'older'")
        .execute(&pool)
        .await
        .expect("backdate failed");
    sqlx::query("UPDATE models SET created_at = '2024-01-01 00:00:00' WHERE name = 'newer'")
        .execute(&pool)
        .await
        .expect("backdate failed");

    let models = list_models(&pool, Some("p1")).await.unwrap();
    assert_eq!(models[0].sort_order, models[1].sort_order);
    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["older", "newer"]);
}
