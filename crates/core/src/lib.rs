//! Live face analysis sessions: model loading, camera capture, a periodic
//! detection loop, overlay rendering and snapshot export.

pub mod analysis;
pub mod capture;
pub mod export;
pub mod loading;
pub mod rendering;
pub mod session;
pub mod shared;
