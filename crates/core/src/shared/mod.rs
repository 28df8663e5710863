pub mod constants;
pub mod frame;
pub mod region;
pub mod session_config;
