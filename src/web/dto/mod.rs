pub mod provider_dto;
pub mod model_dto;
