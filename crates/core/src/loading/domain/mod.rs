pub mod model_readiness;
pub mod model_resolver;
pub mod model_stage;
