mod provider;
pub use provider::{
    LlmSetting,
    ProviderSummary,
    NewProvider,
    ProviderFields,
    ProviderOrder,
    create_provider,
    get_provider_by_id,
    provider_exists,
    list_provider_settings,
    list_provider_summaries,
    list_active_provider_summaries,
    update_provider_fields,
    delete_provider,
    save_provider_orders,
};

mod preload;
pub use preload::{
    LlmConfig,
    preload_llm_configs_to_cache,
    get_llm_config_by_provider,
    invalidate_llm_config,
};
