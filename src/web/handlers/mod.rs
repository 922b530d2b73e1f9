pub mod health_handler;
pub mod provider_handler;
pub mod model_handler;
