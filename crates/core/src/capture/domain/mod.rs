pub mod capture_controller;
pub mod media_device;
