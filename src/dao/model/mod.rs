mod model;
pub use model::{
    LlmModel,
    MODEL_TYPE_DEFAULT,
    MODEL_TYPE_CUSTOM,
    LlmModelView,
    NewModel,
    ModelOrder,
    create_model,
    get_model_by_provider_and_name,
    list_model_views,
    list_visible_model_views,
    list_provider_ids_for_model_name,
    update_selected_by_name,
    update_selected_for_provider,
    update_model_by_provider_and_name,
    delete_models_by_name,
    save_model_orders,
};

mod preload;
pub use preload::{
    cache_provider_models,
    get_provider_models_from_cache,
    invalidate_provider_models,
};
