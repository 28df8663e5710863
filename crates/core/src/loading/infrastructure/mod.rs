pub mod http_model_resolver;
