pub mod detection_loop;
pub mod runtime;
#[allow(clippy::module_inception)]
pub mod session;
pub mod session_logger;
pub mod status_message;
